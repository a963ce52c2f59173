use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::EmailError;
use crate::domain::auth::errors::UserIdError;

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i32);

impl UserId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Parse a user ID from string (access-token subject claim).
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a positive integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        s.parse::<i32>()
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }

    /// Whether this ID can identify a stored user. Database keys start at 1;
    /// zero and negatives never authenticate.
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser (bounded time, no
/// backtracking) and normalises to lowercase: uniqueness is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email.to_lowercase()))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Credential projection used by password login.
///
/// Hash and salt are nullable together: a user created through the OTP flow
/// has no password until one is set.
#[derive(Debug, Clone)]
pub struct UserForLogin {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub password_hash: Option<Vec<u8>>,
    pub password_salt: Option<Vec<u8>>,
    pub is_email_verified: bool,
}

/// The single refresh-token slot of one user.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Pending one-time-code challenge, keyed by email. Upserted whole: only the
/// most recently issued code is ever valid.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub otp_hash: Vec<u8>,
    pub otp_salt: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

/// Current password hash and salt, for old-password verification.
#[derive(Debug, Clone)]
pub struct StoredPassword {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Result of a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Command to register a new user with a password
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
    pub password_confirmation: String,
}

/// Command to authenticate with email and password
#[derive(Debug)]
pub struct PasswordLoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

/// Command to authenticate with email and a one-time code
#[derive(Debug)]
pub struct OtpLoginCommand {
    pub email: EmailAddress,
    pub otp: String,
}

/// Command to change a password, proving knowledge of the current one
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// Command to assign a password, proving identity with a one-time code
#[derive(Debug)]
pub struct SetPasswordCommand {
    pub otp: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Write request: create a user credential row.
#[derive(Debug)]
pub struct RegisterUserRequest {
    pub email: EmailAddress,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

/// Write request: overwrite the user's refresh-token slot.
#[derive(Debug)]
pub struct UpdateRefreshTokenRequest {
    pub user_id: UserId,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Write request: replace the user's password hash and salt.
#[derive(Debug)]
pub struct ChangePasswordRequest {
    pub user_id: UserId,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

/// Write request: replace the pending challenge for an email address.
#[derive(Debug)]
pub struct UpsertOtpChallengeRequest {
    pub email: EmailAddress,
    pub otp_hash: Vec<u8>,
    pub otp_salt: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}
