use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::ChangePasswordRequest;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::OtpChallenge;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::RegisterUserRequest;
use crate::domain::auth::models::StoredPassword;
use crate::domain::auth::models::UpdateRefreshTokenRequest;
use crate::domain::auth::models::UpsertOtpChallengeRequest;
use crate::domain::auth::models::UserForLogin;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialRepository;

pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> AuthError {
    AuthError::Failure(e.to_string())
}

fn corrupt_email(e: impl std::fmt::Display) -> AuthError {
    AuthError::Failure(format!("Stored email is not a valid address: {}", e))
}

#[derive(FromRow)]
struct UserForLoginRow {
    user_id: i32,
    email: String,
    password_hash: Option<Vec<u8>>,
    password_salt: Option<Vec<u8>>,
    is_email_verified: bool,
}

#[derive(FromRow)]
struct RefreshTokenRow {
    user_id: i32,
    refresh_token: String,
    refresh_token_expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OtpChallengeRow {
    user_id: i32,
    email: String,
    otp_hash: Vec<u8>,
    otp_salt: Vec<u8>,
    otp_expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct StoredPasswordRow {
    password_hash: Vec<u8>,
    password_salt: Vec<u8>,
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn user_exists(&self, email: &EmailAddress) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn register_user(&self, request: RegisterUserRequest) -> Result<bool, AuthError> {
        // Upsert: an email-only row created by the OTP flow gains a password
        // instead of colliding. The service refuses existing emails first.
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, password_salt)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                password_salt = EXCLUDED.password_salt
            "#,
        )
        .bind(request.email.as_str())
        .bind(&request.password_hash)
        .bind(&request.password_salt)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_user_for_login(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserForLogin>, AuthError> {
        let row = sqlx::query_as::<_, UserForLoginRow>(
            r#"
            SELECT user_id, email, password_hash, password_salt, is_email_verified
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some(r) => Ok(Some(UserForLogin {
                user_id: UserId::new(r.user_id),
                email: EmailAddress::new(r.email).map_err(corrupt_email)?,
                password_hash: r.password_hash,
                password_salt: r.password_salt,
                is_email_verified: r.is_email_verified,
            })),
            None => Ok(None),
        }
    }

    async fn get_user_id_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserId>, AuthError> {
        let id = sqlx::query_scalar::<_, i32>("SELECT user_id FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(id.map(UserId::new))
    }

    async fn get_user_email_by_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<EmailAddress>, AuthError> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE user_id = $1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        email
            .map(|e| EmailAddress::new(e).map_err(corrupt_email))
            .transpose()
    }

    async fn get_user_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT user_id, refresh_token, refresh_token_expires_at
            FROM users
            WHERE refresh_token = $1
              AND refresh_token_expires_at IS NOT NULL
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|r| RefreshTokenRecord {
            user_id: UserId::new(r.user_id),
            token: r.refresh_token,
            expires_at: r.refresh_token_expires_at,
        }))
    }

    async fn update_refresh_token(
        &self,
        request: UpdateRefreshTokenRequest,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $2, refresh_token_expires_at = $3
            WHERE user_id = $1
            "#,
        )
        .bind(request.user_id.value())
        .bind(&request.refresh_token)
        .bind(request.expires_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn change_password(&self, request: ChangePasswordRequest) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, password_salt = $3
            WHERE user_id = $1
            "#,
        )
        .bind(request.user_id.value())
        .bind(&request.password_hash)
        .bind(&request.password_salt)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_user_for_password_change(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredPassword>, AuthError> {
        let row = sqlx::query_as::<_, StoredPasswordRow>(
            r#"
            SELECT password_hash, password_salt
            FROM users
            WHERE user_id = $1
              AND password_hash IS NOT NULL
              AND password_salt IS NOT NULL
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|r| StoredPassword {
            hash: r.password_hash,
            salt: r.password_salt,
        }))
    }

    async fn upsert_otp_challenge(
        &self,
        request: UpsertOtpChallengeRequest,
    ) -> Result<bool, AuthError> {
        // Keyed by email: an unregistered address gets an email-only row, so
        // responses stay identical for registered and unregistered addresses.
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, otp_hash, otp_salt, otp_expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET otp_hash = EXCLUDED.otp_hash,
                otp_salt = EXCLUDED.otp_salt,
                otp_expires_at = EXCLUDED.otp_expires_at
            "#,
        )
        .bind(request.email.as_str())
        .bind(&request.otp_hash)
        .bind(&request.otp_salt)
        .bind(request.expires_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_otp_challenge(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<OtpChallenge>, AuthError> {
        let row = sqlx::query_as::<_, OtpChallengeRow>(
            r#"
            SELECT user_id, email, otp_hash, otp_salt, otp_expires_at
            FROM users
            WHERE email = $1
              AND otp_hash IS NOT NULL
              AND otp_salt IS NOT NULL
              AND otp_expires_at IS NOT NULL
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some(r) => Ok(Some(OtpChallenge {
                user_id: UserId::new(r.user_id),
                email: EmailAddress::new(r.email).map_err(corrupt_email)?,
                otp_hash: r.otp_hash,
                otp_salt: r.otp_salt,
                expires_at: r.otp_expires_at,
            })),
            None => Ok(None),
        }
    }

    async fn set_email_verified(&self, user_id: UserId) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE users SET is_email_verified = TRUE WHERE user_id = $1")
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
