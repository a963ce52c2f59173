use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::AccessClaims;
use super::errors::JwtError;

/// Issues and verifies signed access tokens.
///
/// Uses HS512 (HMAC with SHA-512) with a symmetric server key. Validation
/// checks signature and expiry only; audience and issuer are deliberately
/// left unvalidated because the token never crosses service boundaries.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenIssuer {
    /// Create a token issuer bound to the server signing key.
    ///
    /// # Errors
    /// * `MissingSigningKey` - the configured key is empty
    pub fn new(token_key: &str) -> Result<Self, JwtError> {
        if token_key.is_empty() {
            return Err(JwtError::MissingSigningKey);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(token_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(token_key.as_bytes()),
            algorithm: Algorithm::HS512,
        })
    }

    /// Create a signed access token for a user, expiring in one hour.
    ///
    /// # Errors
    /// * `EncodingFailed` - token serialization or signing failed
    pub fn create_access_token(&self, user_id: impl ToString) -> Result<String, JwtError> {
        let claims = AccessClaims::for_user(user_id);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate an access token.
    ///
    /// # Errors
    /// * `TokenExpired` - the embedded expiry has passed
    /// * `DecodingFailed` - bad signature or malformed token
    pub fn decode_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let validation = Validation::new(self.algorithm);

        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    _ => JwtError::DecodingFailed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}
