use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::super::ApiError;
use super::super::ApiSuccess;
use crate::domain::auth::models::SetPasswordCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn set_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<SetPasswordRequestBody>,
) -> Result<ApiSuccess<SetPasswordResponseData>, ApiError> {
    state
        .auth_service
        .set_password(
            user.user_id,
            SetPasswordCommand {
                otp: body.otp,
                password: body.password,
                password_confirmation: body.password_confirmation,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SetPasswordResponseData {
            message: "Password set successfully".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetPasswordRequestBody {
    otp: String,
    password: String,
    password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetPasswordResponseData {
    pub message: String,
}
