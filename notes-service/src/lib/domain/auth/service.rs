use std::sync::Arc;

use async_trait::async_trait;
use auth::password::generate_salt;
use auth::refresh;
use auth::OtpGenerator;
use auth::SecretHasher;
use auth::TokenIssuer;
use chrono::Duration;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::ChangePasswordCommand;
use crate::domain::auth::models::ChangePasswordRequest;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::OtpLoginCommand;
use crate::domain::auth::models::PasswordLoginCommand;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterUserRequest;
use crate::domain::auth::models::SetPasswordCommand;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UpdateRefreshTokenRequest;
use crate::domain::auth::models::UpsertOtpChallengeRequest;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::VerificationCodeSender;

/// Refresh tokens live for seven days from each issuance.
const REFRESH_TOKEN_VALIDITY_DAYS: i64 = 7;

/// One-time codes expire ten minutes after issuance.
const OTP_VALIDITY_MINUTES: i64 = 10;

/// Domain service implementation for credential use-cases.
///
/// Composes the credential store and the code-delivery transport with the
/// hashing/token/OTP leaves. Holds no mutable state: every operation reads
/// from the store, verifies or derives, writes back, and responds.
pub struct AuthService<CR, VS>
where
    CR: CredentialRepository,
    VS: VerificationCodeSender,
{
    repository: Arc<CR>,
    code_sender: Arc<VS>,
    secret_hasher: SecretHasher,
    token_issuer: Arc<TokenIssuer>,
    otp_generator: OtpGenerator,
}

impl<CR, VS> AuthService<CR, VS>
where
    CR: CredentialRepository,
    VS: VerificationCodeSender,
{
    /// Create a new auth service with injected dependencies.
    pub fn new(
        repository: Arc<CR>,
        code_sender: Arc<VS>,
        secret_hasher: SecretHasher,
        token_issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            repository,
            code_sender,
            secret_hasher,
            token_issuer,
            otp_generator: OtpGenerator::new(),
        }
    }

    /// Issue an access token and a freshly rotated refresh token.
    async fn issue_token_pair(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let access_token = self
            .token_issuer
            .create_access_token(user_id)
            .map_err(|e| AuthError::Failure(e.to_string()))?;

        let refresh_token = self.create_and_save_refresh_token(user_id).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Overwrite the user's refresh-token slot with a new opaque token.
    async fn create_and_save_refresh_token(&self, user_id: UserId) -> Result<String, AuthError> {
        let token = refresh::generate_token();
        let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_VALIDITY_DAYS);

        let stored = self
            .repository
            .update_refresh_token(UpdateRefreshTokenRequest {
                user_id,
                refresh_token: token.clone(),
                expires_at,
            })
            .await?;

        if !stored {
            return Err(AuthError::Failure("Failed to store refresh token".to_string()));
        }

        Ok(token)
    }

    /// Shared identity proof for the passwordless-login and password-setting
    /// paths: resolve the pending challenge and check the code against it.
    async fn verify_email_and_otp(
        &self,
        email: &EmailAddress,
        otp: &str,
    ) -> Result<UserId, AuthError> {
        let challenge = self
            .repository
            .get_otp_challenge(email)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound("No verification code was requested for this email".to_string())
            })?;

        // The exact-expiry instant fails closed.
        if Utc::now() >= challenge.expires_at {
            return Err(AuthError::invalid_credentials());
        }

        if !self
            .secret_hasher
            .verify(otp, &challenge.otp_salt, &challenge.otp_hash)
        {
            return Err(AuthError::invalid_credentials());
        }

        Ok(challenge.user_id)
    }
}

#[async_trait]
impl<CR, VS> AuthServicePort for AuthService<CR, VS>
where
    CR: CredentialRepository,
    VS: VerificationCodeSender,
{
    async fn register(&self, command: RegisterCommand) -> Result<(), AuthError> {
        if command.password != command.password_confirmation {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        if self.repository.user_exists(&command.email).await? {
            return Err(AuthError::Conflict("User already exists".to_string()));
        }

        let salt = generate_salt();
        let hash = self.secret_hasher.hash(&command.password, &salt);

        let registered = self
            .repository
            .register_user(RegisterUserRequest {
                email: command.email,
                password_hash: hash.to_vec(),
                password_salt: salt.to_vec(),
            })
            .await?;

        if !registered {
            return Err(AuthError::Failure("Failed to register user".to_string()));
        }

        Ok(())
    }

    async fn login_with_password(
        &self,
        command: PasswordLoginCommand,
    ) -> Result<TokenPair, AuthError> {
        let user = self
            .repository
            .get_user_for_login(&command.email)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        let (Some(hash), Some(salt)) = (&user.password_hash, &user.password_salt) else {
            return Err(AuthError::invalid_credentials());
        };

        if !self.secret_hasher.verify(&command.password, salt, hash) {
            return Err(AuthError::invalid_credentials());
        }

        if !user.is_email_verified {
            return Err(AuthError::invalid_credentials());
        }

        let user_id = self
            .repository
            .get_user_id_by_email(&command.email)
            .await?
            .ok_or_else(|| AuthError::Failure("Something went wrong".to_string()))?;

        self.issue_token_pair(user_id).await
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let record = self
            .repository
            .get_user_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        // The lookup is by token value already; re-check equality so a store
        // that matched loosely can never authenticate a different token.
        if refresh_token != record.token {
            return Err(AuthError::invalid_credentials());
        }

        // The exact-expiry instant fails closed.
        if Utc::now() >= record.expires_at {
            return Err(AuthError::invalid_credentials());
        }

        self.issue_token_pair(record.user_id).await
    }

    async fn send_otp(&self, email: &EmailAddress) -> Result<(), AuthError> {
        let otp = self.otp_generator.generate();

        let salt = generate_salt();
        let otp_hash = self.secret_hasher.hash(&otp, &salt);
        let expires_at = Utc::now() + Duration::minutes(OTP_VALIDITY_MINUTES);

        // Upsert regardless of whether the email is registered: the response
        // must not reveal which addresses have accounts.
        let stored = self
            .repository
            .upsert_otp_challenge(UpsertOtpChallengeRequest {
                email: email.clone(),
                otp_hash: otp_hash.to_vec(),
                otp_salt: salt.to_vec(),
                expires_at,
            })
            .await?;

        if !stored {
            return Err(AuthError::Failure(
                "Failed to store verification code".to_string(),
            ));
        }

        if let Err(e) = self.code_sender.send_verification_code(email, &otp).await {
            tracing::error!(error = %e, "Failed to deliver verification code");
            return Err(AuthError::from(e));
        }

        Ok(())
    }

    async fn login_with_otp(&self, command: OtpLoginCommand) -> Result<TokenPair, AuthError> {
        let user_id = self
            .verify_email_and_otp(&command.email, &command.otp)
            .await?;

        let verified = self.repository.set_email_verified(user_id).await?;

        if !verified {
            return Err(AuthError::Failure(
                "Failed to mark email as verified".to_string(),
            ));
        }

        self.issue_token_pair(user_id).await
    }

    async fn change_password(
        &self,
        user_id: UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError> {
        if !user_id.is_valid() {
            return Err(AuthError::Unauthorized("User not authorized".to_string()));
        }

        let stored = self
            .repository
            .get_user_for_password_change(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if !self
            .secret_hasher
            .verify(&command.old_password, &stored.salt, &stored.hash)
        {
            return Err(AuthError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        if command.new_password == command.old_password {
            return Err(AuthError::Validation(
                "New password cannot be the same as the old password".to_string(),
            ));
        }

        if command.new_password != command.new_password_confirmation {
            return Err(AuthError::Validation(
                "New passwords do not match".to_string(),
            ));
        }

        let salt = generate_salt();
        let hash = self.secret_hasher.hash(&command.new_password, &salt);

        let changed = self
            .repository
            .change_password(ChangePasswordRequest {
                user_id,
                password_hash: hash.to_vec(),
                password_salt: salt.to_vec(),
            })
            .await?;

        if !changed {
            return Err(AuthError::Failure("Failed to change password".to_string()));
        }

        Ok(())
    }

    async fn set_password(
        &self,
        user_id: UserId,
        command: SetPasswordCommand,
    ) -> Result<(), AuthError> {
        if !user_id.is_valid() {
            return Err(AuthError::Unauthorized("User not authorized".to_string()));
        }

        let email = self
            .repository
            .get_user_email_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        self.verify_email_and_otp(&email, &command.otp).await?;

        if command.password != command.password_confirmation {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        let salt = generate_salt();
        let hash = self.secret_hasher.hash(&command.password, &salt);

        let changed = self
            .repository
            .change_password(ChangePasswordRequest {
                user_id,
                password_hash: hash.to_vec(),
                password_salt: salt.to_vec(),
            })
            .await?;

        if !changed {
            return Err(AuthError::Failure("Failed to set password".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::auth::errors::EmailSendError;
    use crate::domain::auth::models::OtpChallenge;
    use crate::domain::auth::models::RefreshTokenRecord;
    use crate::domain::auth::models::StoredPassword;
    use crate::domain::auth::models::UserForLogin;

    // Define mocks in the test module using mockall
    mock! {
        pub TestCredentialRepository {}

        #[async_trait]
        impl CredentialRepository for TestCredentialRepository {
            async fn user_exists(&self, email: &EmailAddress) -> Result<bool, AuthError>;
            async fn register_user(&self, request: RegisterUserRequest) -> Result<bool, AuthError>;
            async fn get_user_for_login(&self, email: &EmailAddress) -> Result<Option<UserForLogin>, AuthError>;
            async fn get_user_id_by_email(&self, email: &EmailAddress) -> Result<Option<UserId>, AuthError>;
            async fn get_user_email_by_id(&self, user_id: UserId) -> Result<Option<EmailAddress>, AuthError>;
            async fn get_user_by_refresh_token(&self, refresh_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;
            async fn update_refresh_token(&self, request: UpdateRefreshTokenRequest) -> Result<bool, AuthError>;
            async fn change_password(&self, request: ChangePasswordRequest) -> Result<bool, AuthError>;
            async fn get_user_for_password_change(&self, user_id: UserId) -> Result<Option<StoredPassword>, AuthError>;
            async fn upsert_otp_challenge(&self, request: UpsertOtpChallengeRequest) -> Result<bool, AuthError>;
            async fn get_otp_challenge(&self, email: &EmailAddress) -> Result<Option<OtpChallenge>, AuthError>;
            async fn set_email_verified(&self, user_id: UserId) -> Result<bool, AuthError>;
        }
    }

    mock! {
        pub TestCodeSender {}

        #[async_trait]
        impl VerificationCodeSender for TestCodeSender {
            async fn send_verification_code(&self, to: &EmailAddress, code: &str) -> Result<(), EmailSendError>;
        }
    }

    const TEST_PASSWORD_KEY: &str = "unit-test-password-key";
    const TEST_TOKEN_KEY: &str = "unit-test-token-signing-key-long-enough-for-hs512-in-tests!";

    fn service(
        repository: MockTestCredentialRepository,
        code_sender: MockTestCodeSender,
    ) -> AuthService<MockTestCredentialRepository, MockTestCodeSender> {
        AuthService::new(
            Arc::new(repository),
            Arc::new(code_sender),
            SecretHasher::new(TEST_PASSWORD_KEY).unwrap(),
            Arc::new(TokenIssuer::new(TEST_TOKEN_KEY).unwrap()),
        )
    }

    fn email(address: &str) -> EmailAddress {
        EmailAddress::new(address.to_string()).unwrap()
    }

    /// Hash a secret the way production does, returning (hash, salt).
    fn hashed(secret: &str) -> (Vec<u8>, Vec<u8>) {
        let hasher = SecretHasher::new(TEST_PASSWORD_KEY).unwrap();
        let salt = generate_salt();
        let hash = hasher.hash(secret, &salt);
        (hash.to_vec(), salt.to_vec())
    }

    fn user_with_password(address: &str, password: &str, verified: bool) -> UserForLogin {
        let (hash, salt) = hashed(password);
        UserForLogin {
            user_id: UserId::new(7),
            email: email(address),
            password_hash: Some(hash),
            password_salt: Some(salt),
            is_email_verified: verified,
        }
    }

    fn challenge_with_code(address: &str, code: &str, expires_in_secs: i64) -> OtpChallenge {
        let (hash, salt) = hashed(code);
        OtpChallenge {
            user_id: UserId::new(7),
            email: email(address),
            otp_hash: hash,
            otp_salt: salt,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    // --- register ---

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_user_exists()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_register_user()
            .withf(|request| {
                request.email.as_str() == "a@x.com"
                    && request.password_hash.len() == 32
                    && request.password_salt.len() == 16
            })
            .times(1)
            .returning(|_| Ok(true));

        let service = service(repository, code_sender);

        let result = service
            .register(RegisterCommand {
                email: email("a@x.com"),
                password: "P1".to_string(),
                password_confirmation: "P1".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_confirmation_mismatch() {
        let repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let service = service(repository, code_sender);

        let result = service
            .register(RegisterCommand {
                email: email("a@x.com"),
                password: "P1".to_string(),
                password_confirmation: "P2".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_existing_email_conflicts() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_user_exists()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_register_user().times(0);

        let service = service(repository, code_sender);

        let result = service
            .register(RegisterCommand {
                email: email("a@x.com"),
                password: "P1".to_string(),
                password_confirmation: "P1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Conflict(_))));
    }

    // --- login_with_password ---

    #[tokio::test]
    async fn test_login_success_returns_both_tokens() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let user = user_with_password("a@x.com", "password123", true);
        repository
            .expect_get_user_for_login()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_get_user_id_by_email()
            .times(1)
            .returning(|_| Ok(Some(UserId::new(7))));
        repository
            .expect_update_refresh_token()
            .withf(|request| {
                request.user_id == UserId::new(7)
                    && !request.refresh_token.is_empty()
                    && request.expires_at > Utc::now() + Duration::days(6)
            })
            .times(1)
            .returning(|_| Ok(true));

        let service = service(repository, code_sender);

        let tokens = service
            .login_with_password(PasswordLoginCommand {
                email: email("a@x.com"),
                password: "password123".to_string(),
            })
            .await
            .expect("Login failed");

        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());

        // The access token identifies the user
        let claims = TokenIssuer::new(TEST_TOKEN_KEY)
            .unwrap()
            .decode_access_token(&tokens.access_token)
            .expect("Access token did not validate");
        assert_eq!(claims.sub, "7");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let user = user_with_password("a@x.com", "password123", true);
        repository
            .expect_get_user_for_login()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_update_refresh_token().times(0);

        let service = service(repository, code_sender);

        let result = service
            .login_with_password(PasswordLoginCommand {
                email: email("a@x.com"),
                // One character altered
                password: "password124".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_for_login()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, code_sender);

        let result = service
            .login_with_password(PasswordLoginCommand {
                email: email("nobody@x.com"),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_without_password_set_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository.expect_get_user_for_login().times(1).returning(|_| {
            Ok(Some(UserForLogin {
                user_id: UserId::new(7),
                email: email("a@x.com"),
                password_hash: None,
                password_salt: None,
                is_email_verified: true,
            }))
        });

        let service = service(repository, code_sender);

        let result = service
            .login_with_password(PasswordLoginCommand {
                email: email("a@x.com"),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_unverified_email_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let user = user_with_password("a@x.com", "password123", false);
        repository
            .expect_get_user_for_login()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_update_refresh_token().times(0);

        let service = service(repository, code_sender);

        let result = service
            .login_with_password(PasswordLoginCommand {
                email: email("a@x.com"),
                // Correct password, but the email was never verified
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    // --- refresh_tokens ---

    #[tokio::test]
    async fn test_refresh_rotates_the_stored_token() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let current = refresh::generate_token();
        let record = RefreshTokenRecord {
            user_id: UserId::new(7),
            token: current.clone(),
            expires_at: Utc::now() + Duration::days(3),
        };
        repository
            .expect_get_user_by_refresh_token()
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));

        let previous = current.clone();
        repository
            .expect_update_refresh_token()
            .withf(move |request| {
                request.user_id == UserId::new(7) && request.refresh_token != previous
            })
            .times(1)
            .returning(|_| Ok(true));

        let service = service(repository, code_sender);

        let tokens = service
            .refresh_tokens(&current)
            .await
            .expect("Refresh failed");

        assert_ne!(tokens.refresh_token, current);
    }

    #[tokio::test]
    async fn test_refresh_unknown_token_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_by_refresh_token()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, code_sender);

        let result = service.refresh_tokens("rotated-away-token").await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_refresh_mismatched_record_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_by_refresh_token()
            .times(1)
            .returning(|_| {
                Ok(Some(RefreshTokenRecord {
                    user_id: UserId::new(7),
                    token: "a-different-token".to_string(),
                    expires_at: Utc::now() + Duration::days(3),
                }))
            });
        repository.expect_update_refresh_token().times(0);

        let service = service(repository, code_sender);

        let result = service.refresh_tokens("the-presented-token").await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_refresh_at_expiry_instant_fails_closed() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let token = refresh::generate_token();
        let record = RefreshTokenRecord {
            user_id: UserId::new(7),
            token: token.clone(),
            // Already at (and past, by evaluation time) the boundary
            expires_at: Utc::now(),
        };
        repository
            .expect_get_user_by_refresh_token()
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        repository.expect_update_refresh_token().times(0);

        let service = service(repository, code_sender);

        let result = service.refresh_tokens(&token).await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    // --- send_otp ---

    #[tokio::test]
    async fn test_send_otp_stores_challenge_then_sends_code() {
        let mut repository = MockTestCredentialRepository::new();
        let mut code_sender = MockTestCodeSender::new();

        repository
            .expect_upsert_otp_challenge()
            .withf(|request| {
                request.email.as_str() == "a@x.com"
                    && request.otp_hash.len() == 32
                    && request.otp_salt.len() == 16
                    && request.expires_at > Utc::now() + Duration::minutes(9)
            })
            .times(1)
            .returning(|_| Ok(true));
        code_sender
            .expect_send_verification_code()
            .withf(|_, code| code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, code_sender);

        let result = service.send_otp(&email("a@x.com")).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_otp_delivery_failure_surfaces() {
        let mut repository = MockTestCredentialRepository::new();
        let mut code_sender = MockTestCodeSender::new();

        repository
            .expect_upsert_otp_challenge()
            .times(1)
            .returning(|_| Ok(true));
        code_sender
            .expect_send_verification_code()
            .times(1)
            .returning(|_, _| Err(EmailSendError::SendFailed("provider returned 500".to_string())));

        let service = service(repository, code_sender);

        let result = service.send_otp(&email("a@x.com")).await;

        assert!(matches!(result, Err(AuthError::Failure(_))));
    }

    #[tokio::test]
    async fn test_send_otp_store_refusal_skips_delivery() {
        let mut repository = MockTestCredentialRepository::new();
        let mut code_sender = MockTestCodeSender::new();

        repository
            .expect_upsert_otp_challenge()
            .times(1)
            .returning(|_| Ok(false));
        code_sender.expect_send_verification_code().times(0);

        let service = service(repository, code_sender);

        let result = service.send_otp(&email("a@x.com")).await;

        assert!(matches!(result, Err(AuthError::Failure(_))));
    }

    // --- login_with_otp ---

    #[tokio::test]
    async fn test_otp_login_success_marks_email_verified() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let challenge = challenge_with_code("a@x.com", "004821", 300);
        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(move |_| Ok(Some(challenge.clone())));
        repository
            .expect_set_email_verified()
            .with(eq(UserId::new(7)))
            .times(1)
            .returning(|_| Ok(true));
        repository
            .expect_update_refresh_token()
            .times(1)
            .returning(|_| Ok(true));

        let service = service(repository, code_sender);

        let tokens = service
            .login_with_otp(OtpLoginCommand {
                email: email("a@x.com"),
                otp: "004821".to_string(),
            })
            .await
            .expect("OTP login failed");

        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_otp_login_wrong_code_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let challenge = challenge_with_code("a@x.com", "004821", 300);
        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(move |_| Ok(Some(challenge.clone())));
        repository.expect_set_email_verified().times(0);

        let service = service(repository, code_sender);

        let result = service
            .login_with_otp(OtpLoginCommand {
                email: email("a@x.com"),
                otp: "004822".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_otp_login_expired_challenge_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        // Correct code, but the challenge expired a minute ago
        let challenge = challenge_with_code("a@x.com", "004821", -60);
        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(move |_| Ok(Some(challenge.clone())));
        repository.expect_set_email_verified().times(0);

        let service = service(repository, code_sender);

        let result = service
            .login_with_otp(OtpLoginCommand {
                email: email("a@x.com"),
                otp: "004821".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_otp_login_without_challenge_is_not_found() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, code_sender);

        let result = service
            .login_with_otp(OtpLoginCommand {
                email: email("a@x.com"),
                otp: "004821".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    // --- change_password ---

    #[tokio::test]
    async fn test_change_password_success() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let (hash, salt) = hashed("old-password");
        let old_salt = salt.clone();
        repository
            .expect_get_user_for_password_change()
            .with(eq(UserId::new(7)))
            .times(1)
            .returning(move |_| {
                Ok(Some(StoredPassword {
                    hash: hash.clone(),
                    salt: salt.clone(),
                }))
            });
        repository
            .expect_change_password()
            .withf(move |request| {
                request.user_id == UserId::new(7)
                    && request.password_hash.len() == 32
                    && request.password_salt != old_salt
            })
            .times(1)
            .returning(|_| Ok(true));

        let service = service(repository, code_sender);

        let result = service
            .change_password(
                UserId::new(7),
                ChangePasswordCommand {
                    old_password: "old-password".to_string(),
                    new_password: "new-password".to_string(),
                    new_password_confirmation: "new-password".to_string(),
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_reused_password_never_touches_store() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let (hash, salt) = hashed("same-password");
        repository
            .expect_get_user_for_password_change()
            .times(1)
            .returning(move |_| {
                Ok(Some(StoredPassword {
                    hash: hash.clone(),
                    salt: salt.clone(),
                }))
            });
        repository.expect_change_password().times(0);

        let service = service(repository, code_sender);

        let result = service
            .change_password(
                UserId::new(7),
                ChangePasswordCommand {
                    old_password: "same-password".to_string(),
                    new_password: "same-password".to_string(),
                    new_password_confirmation: "same-password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let (hash, salt) = hashed("actual-password");
        repository
            .expect_get_user_for_password_change()
            .times(1)
            .returning(move |_| {
                Ok(Some(StoredPassword {
                    hash: hash.clone(),
                    salt: salt.clone(),
                }))
            });
        repository.expect_change_password().times(0);

        let service = service(repository, code_sender);

        let result = service
            .change_password(
                UserId::new(7),
                ChangePasswordCommand {
                    old_password: "guessed-password".to_string(),
                    new_password: "new-password".to_string(),
                    new_password_confirmation: "new-password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_change_password_confirmation_mismatch() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let (hash, salt) = hashed("old-password");
        repository
            .expect_get_user_for_password_change()
            .times(1)
            .returning(move |_| {
                Ok(Some(StoredPassword {
                    hash: hash.clone(),
                    salt: salt.clone(),
                }))
            });
        repository.expect_change_password().times(0);

        let service = service(repository, code_sender);

        let result = service
            .change_password(
                UserId::new(7),
                ChangePasswordCommand {
                    old_password: "old-password".to_string(),
                    new_password: "new-password".to_string(),
                    new_password_confirmation: "new-passw0rd".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_password_requires_authenticated_user() {
        let repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        let service = service(repository, code_sender);

        let result = service
            .change_password(
                UserId::new(0),
                ChangePasswordCommand {
                    old_password: "old".to_string(),
                    new_password: "new".to_string(),
                    new_password_confirmation: "new".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    // --- set_password ---

    #[tokio::test]
    async fn test_set_password_success_with_otp_proof() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_email_by_id()
            .with(eq(UserId::new(7)))
            .times(1)
            .returning(|_| Ok(Some(email("a@x.com"))));

        let challenge = challenge_with_code("a@x.com", "271828", 300);
        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(move |_| Ok(Some(challenge.clone())));
        repository
            .expect_change_password()
            .withf(|request| request.user_id == UserId::new(7) && request.password_hash.len() == 32)
            .times(1)
            .returning(|_| Ok(true));

        let service = service(repository, code_sender);

        let result = service
            .set_password(
                UserId::new(7),
                SetPasswordCommand {
                    otp: "271828".to_string(),
                    password: "first-password".to_string(),
                    password_confirmation: "first-password".to_string(),
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_set_password_wrong_code_is_unauthorized() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_email_by_id()
            .times(1)
            .returning(|_| Ok(Some(email("a@x.com"))));

        let challenge = challenge_with_code("a@x.com", "271828", 300);
        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(move |_| Ok(Some(challenge.clone())));
        repository.expect_change_password().times(0);

        let service = service(repository, code_sender);

        let result = service
            .set_password(
                UserId::new(7),
                SetPasswordCommand {
                    otp: "314159".to_string(),
                    password: "first-password".to_string(),
                    password_confirmation: "first-password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_set_password_confirmation_mismatch() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_email_by_id()
            .times(1)
            .returning(|_| Ok(Some(email("a@x.com"))));

        let challenge = challenge_with_code("a@x.com", "271828", 300);
        repository
            .expect_get_otp_challenge()
            .times(1)
            .returning(move |_| Ok(Some(challenge.clone())));
        repository.expect_change_password().times(0);

        let service = service(repository, code_sender);

        let result = service
            .set_password(
                UserId::new(7),
                SetPasswordCommand {
                    otp: "271828".to_string(),
                    password: "first-password".to_string(),
                    password_confirmation: "other-password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_password_unknown_user_is_not_found() {
        let mut repository = MockTestCredentialRepository::new();
        let code_sender = MockTestCodeSender::new();

        repository
            .expect_get_user_email_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, code_sender);

        let result = service
            .set_password(
                UserId::new(7),
                SetPasswordCommand {
                    otp: "271828".to_string(),
                    password: "first-password".to_string(),
                    password_confirmation: "first-password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }
}
