//! Credential primitives library
//!
//! Provides the cryptographic building blocks for the notes service:
//! - Keyed secret hashing (HMAC-derived salt + PBKDF2)
//! - Signed access tokens and opaque refresh tokens
//! - Numeric one-time codes
//!
//! Every construct here is pure and synchronous; persistence and
//! orchestration belong to the consuming service. Constructors that need a
//! server-side key refuse an empty one, so a misconfigured deployment fails
//! at startup instead of hashing against an empty secret.
//!
//! # Examples
//!
//! ## Secret hashing
//! ```
//! use auth::SecretHasher;
//!
//! let hasher = SecretHasher::new("server-side-pepper-key").unwrap();
//! let salt = auth::password::generate_salt();
//! let hash = hasher.hash("my_password", &salt);
//! assert!(hasher.verify("my_password", &salt, &hash));
//! ```
//!
//! ## Access tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new("signing_key_of_64+_bytes_for_hs512_in_production").unwrap();
//! let token = issuer.create_access_token(42).unwrap();
//! let claims = issuer.decode_access_token(&token).unwrap();
//! assert_eq!(claims.sub, "42");
//! ```
//!
//! ## Refresh tokens and one-time codes
//! ```
//! use auth::OtpGenerator;
//!
//! let refresh = auth::refresh::generate_token();
//! assert!(!refresh.contains('='));
//!
//! let code = OtpGenerator::new().generate();
//! assert_eq!(code.len(), 6);
//! ```

pub mod jwt;
pub mod otp;
pub mod password;
pub mod refresh;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::TokenIssuer;
pub use otp::OtpGenerator;
pub use password::PasswordError;
pub use password::SecretHasher;
