use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::super::ApiError;
use super::super::ApiSuccess;
use super::login::TokensResponseData;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::OtpLoginCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn login_with_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpLoginRequestBody>,
) -> Result<ApiSuccess<TokensResponseData>, ApiError> {
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    state
        .auth_service
        .login_with_otp(OtpLoginCommand {
            email,
            otp: body.otp,
        })
        .await
        .map_err(ApiError::from)
        .map(|ref tokens| ApiSuccess::new(StatusCode::OK, tokens.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpLoginRequestBody {
    email: String,
    otp: String,
}
