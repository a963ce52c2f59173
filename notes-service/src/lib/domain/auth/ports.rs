use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::EmailSendError;
use crate::domain::auth::models::ChangePasswordCommand;
use crate::domain::auth::models::ChangePasswordRequest;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::OtpChallenge;
use crate::domain::auth::models::OtpLoginCommand;
use crate::domain::auth::models::PasswordLoginCommand;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterUserRequest;
use crate::domain::auth::models::SetPasswordCommand;
use crate::domain::auth::models::StoredPassword;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UpdateRefreshTokenRequest;
use crate::domain::auth::models::UpsertOtpChallengeRequest;
use crate::domain::auth::models::UserForLogin;
use crate::domain::auth::models::UserId;

/// Port for credential use-cases.
///
/// Stateless between calls; all state lives behind [`CredentialRepository`].
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user with a password. Success carries no tokens; the
    /// email must be verified before password login is accepted.
    ///
    /// # Errors
    /// * `Validation` - password and confirmation differ
    /// * `Conflict` - the email is already registered
    /// * `Failure` - the store refused the write
    async fn register(&self, command: RegisterCommand) -> Result<(), AuthError>;

    /// Authenticate with email and password, issuing both token types.
    ///
    /// # Errors
    /// * `Unauthorized` - uniform rejection: unknown user, no password set,
    ///   wrong password, or unverified email
    /// * `Failure` - the store refused a read or write
    async fn login_with_password(
        &self,
        command: PasswordLoginCommand,
    ) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a fresh token pair, rotating the stored
    /// refresh token. The predecessor token is invalid afterwards.
    ///
    /// # Errors
    /// * `Unauthorized` - unknown, mismatched or expired token
    /// * `Failure` - the store refused a read or write
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Issue a one-time code to an email address and store its challenge.
    /// Success is generic whether or not the address belongs to a user.
    ///
    /// # Errors
    /// * `Failure` - the store refused the upsert, or delivery failed
    async fn send_otp(&self, email: &EmailAddress) -> Result<(), AuthError>;

    /// Passwordless login: prove control of the email with a one-time code,
    /// mark the email verified, and issue both token types.
    ///
    /// # Errors
    /// * `NotFound` - no pending challenge for this email
    /// * `Unauthorized` - expired challenge or wrong code
    /// * `Failure` - the store refused a read or write
    async fn login_with_otp(&self, command: OtpLoginCommand) -> Result<TokenPair, AuthError>;

    /// Replace the password of an authenticated user, proving knowledge of
    /// the current one.
    ///
    /// # Errors
    /// * `Unauthorized` - caller not authenticated, or wrong old password
    /// * `NotFound` - no stored credentials for this user
    /// * `Validation` - new password reused or confirmation mismatch
    /// * `Failure` - the store refused the write
    async fn change_password(
        &self,
        user_id: UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError>;

    /// Assign a password to an authenticated user, substituting one-time-code
    /// proof for old-password proof.
    ///
    /// # Errors
    /// * `Unauthorized` - caller not authenticated, expired challenge or
    ///   wrong code
    /// * `NotFound` - unknown user or no pending challenge
    /// * `Validation` - confirmation mismatch
    /// * `Failure` - the store refused the write
    async fn set_password(
        &self,
        user_id: UserId,
        command: SetPasswordCommand,
    ) -> Result<(), AuthError>;
}

/// Persistence operations for user credentials.
///
/// Every write is a single statement: concurrent writers resolve at the
/// store with last-writer-wins on the refresh-token slot and the challenge.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Whether a credential row exists for this email.
    async fn user_exists(&self, email: &EmailAddress) -> Result<bool, AuthError>;

    /// Persist a new user credential. Returns false when the store refused
    /// the write.
    async fn register_user(&self, request: RegisterUserRequest) -> Result<bool, AuthError>;

    /// Credential projection for password login (None if no such email).
    async fn get_user_for_login(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserForLogin>, AuthError>;

    /// Resolve an email to its user ID.
    async fn get_user_id_by_email(&self, email: &EmailAddress)
        -> Result<Option<UserId>, AuthError>;

    /// Resolve a user ID to its email.
    async fn get_user_email_by_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<EmailAddress>, AuthError>;

    /// Look up the refresh-token slot holding exactly this token value.
    async fn get_user_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Overwrite the user's refresh-token slot.
    async fn update_refresh_token(
        &self,
        request: UpdateRefreshTokenRequest,
    ) -> Result<bool, AuthError>;

    /// Replace the user's password hash and salt.
    async fn change_password(&self, request: ChangePasswordRequest) -> Result<bool, AuthError>;

    /// Current hash and salt for old-password verification (None if the user
    /// does not exist or has no password).
    async fn get_user_for_password_change(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredPassword>, AuthError>;

    /// Replace the pending challenge for an email. Creates an email-only
    /// user row when the address is not registered yet.
    async fn upsert_otp_challenge(
        &self,
        request: UpsertOtpChallengeRequest,
    ) -> Result<bool, AuthError>;

    /// The pending challenge for an email, if any.
    async fn get_otp_challenge(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<OtpChallenge>, AuthError>;

    /// Mark the user's email as verified.
    async fn set_email_verified(&self, user_id: UserId) -> Result<bool, AuthError>;
}

/// Outbound delivery of one-time codes.
///
/// Can fail, can be slow; no retry is attempted here. Deadlines belong to
/// the transport implementation.
#[async_trait]
pub trait VerificationCodeSender: Send + Sync + 'static {
    /// Deliver a verification code to the address.
    ///
    /// # Errors
    /// * `SendFailed` - the provider rejected the message
    /// * `ConnectionFailed` - the provider was unreachable
    async fn send_verification_code(
        &self,
        to: &EmailAddress,
        code: &str,
    ) -> Result<(), EmailSendError>;
}
