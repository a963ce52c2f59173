use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid user ID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for verification-code delivery
#[derive(Debug, Clone, Error)]
pub enum EmailSendError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Email provider unreachable: {0}")]
    ConnectionFailed(String),
}

/// Tagged outcome for every credential operation.
///
/// `Failure` is reserved for collaborator faults (store, email transport)
/// and is the only class a caller might reasonably retry.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Failure(String),
}

impl AuthError {
    /// The uniform credential-rejection error. Every failed proof on an
    /// unauthenticated path (unknown user, unset password, wrong password,
    /// bad or expired code or token) maps to this one message so a response
    /// never reveals which check failed.
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("Invalid credentials".to_string())
    }
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<EmailSendError> for AuthError {
    fn from(err: EmailSendError) -> Self {
        Self::Failure(err.to_string())
    }
}
