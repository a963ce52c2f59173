use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::super::ApiError;
use super::super::ApiSuccess;
use super::create_note::NoteData;
use crate::domain::note::models::NoteId;
use crate::domain::note::models::UpdateNoteCommand;
use crate::domain::note::ports::NoteServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<i32>,
    Json(body): Json<UpdateNoteRequestBody>,
) -> Result<ApiSuccess<NoteData>, ApiError> {
    state
        .note_service
        .update_note(
            user.user_id,
            UpdateNoteCommand {
                note_id: NoteId::new(note_id),
                title: body.title,
                body: body.body,
            },
        )
        .await
        .map_err(ApiError::from)
        .map(|ref note| ApiSuccess::new(StatusCode::OK, note.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateNoteRequestBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}
