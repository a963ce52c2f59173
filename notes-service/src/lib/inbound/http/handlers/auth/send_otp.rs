use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::super::ApiError;
use super::super::ApiSuccess;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequestBody>,
) -> Result<ApiSuccess<SendOtpResponseData>, ApiError> {
    let email = EmailAddress::new(body.email)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .auth_service
        .send_otp(&email)
        .await
        .map_err(ApiError::from)?;

    // Same response whether or not the address belongs to a user
    Ok(ApiSuccess::new(
        StatusCode::OK,
        SendOtpResponseData {
            message: "Verification code sent".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendOtpRequestBody {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOtpResponseData {
    pub message: String,
}
