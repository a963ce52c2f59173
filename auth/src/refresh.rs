use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Entropy of a refresh token before encoding.
const TOKEN_BYTES: usize = 64;

/// Generate an opaque refresh token: 64 random bytes, base64url without
/// padding.
///
/// Carries no claims; the service resolves it to an identity through a store
/// lookup. Expiry is tracked next to the stored token, not inside it.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_url_safe_without_padding() {
        let token = generate_token();

        // 64 bytes -> ceil(64 * 4 / 3) unpadded characters
        assert_eq!(token.len(), 86);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
