use thiserror::Error;

/// Error type for secret-hashing configuration.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing key is not configured")]
    MissingServerKey,

    #[error("Password hashing key is unusable: {0}")]
    InvalidServerKey(String),
}
