use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access-token claims.
///
/// Self-contained: the token carries the user identity and an absolute
/// expiry, and is verified by signature alone. No audience or issuer claims
/// are set; the token only ever binds to this one service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject: the user identifier
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Access-token lifetime.
    const VALIDITY_HOURS: i64 = 1;

    /// Create claims for a user with the fixed one-hour expiry.
    pub fn for_user(user_id: impl ToString) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(Self::VALIDITY_HOURS);

        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}
