use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::super::ApiError;
use super::super::ApiSuccess;
use super::create_note::NoteData;
use crate::domain::note::ports::NoteServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<Vec<NoteData>>, ApiError> {
    state
        .note_service
        .list_notes(user.user_id)
        .await
        .map_err(ApiError::from)
        .map(|notes| {
            let data = notes.iter().map(NoteData::from).collect();
            ApiSuccess::new(StatusCode::OK, data)
        })
}
