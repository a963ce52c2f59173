use thiserror::Error;

/// Error type for access-token operations.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Token signing key is not configured")]
    MissingSigningKey,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,
}
