use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::models::UserId;
use crate::domain::note::errors::NoteError;
use crate::domain::note::models::CreateNoteCommand;
use crate::domain::note::models::Note;
use crate::domain::note::models::NoteId;
use crate::domain::note::models::UpdateNoteCommand;
use crate::domain::note::ports::NoteRepository;
use crate::domain::note::ports::NoteServicePort;

/// Domain service implementation for note operations.
pub struct NoteService<NR>
where
    NR: NoteRepository,
{
    repository: Arc<NR>,
}

impl<NR> NoteService<NR>
where
    NR: NoteRepository,
{
    pub fn new(repository: Arc<NR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<NR> NoteServicePort for NoteService<NR>
where
    NR: NoteRepository,
{
    async fn create_note(
        &self,
        user_id: UserId,
        command: CreateNoteCommand,
    ) -> Result<Note, NoteError> {
        if command.title.trim().is_empty() && command.body.trim().is_empty() {
            return Err(NoteError::Validation(
                "Note should have at least a title or body".to_string(),
            ));
        }

        self.repository
            .create(user_id, &command.title, &command.body)
            .await
    }

    async fn get_note(&self, user_id: UserId, note_id: NoteId) -> Result<Note, NoteError> {
        self.repository
            .find_by_id(note_id, user_id)
            .await?
            .ok_or(NoteError::NotFound)
    }

    async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, NoteError> {
        self.repository.list_by_user(user_id).await
    }

    async fn update_note(
        &self,
        user_id: UserId,
        command: UpdateNoteCommand,
    ) -> Result<Note, NoteError> {
        if command.note_id.value() <= 0 {
            return Err(NoteError::Validation("Invalid note ID".to_string()));
        }

        if command.title.trim().is_empty() && command.body.trim().is_empty() {
            return Err(NoteError::Validation(
                "At least title or body must be provided".to_string(),
            ));
        }

        self.repository
            .update(command.note_id, user_id, &command.title, &command.body)
            .await?
            .ok_or(NoteError::NotFound)
    }

    async fn delete_note(&self, user_id: UserId, note_id: NoteId) -> Result<(), NoteError> {
        let deleted = self.repository.delete(note_id, user_id).await?;

        if !deleted {
            return Err(NoteError::NotFound);
        }

        Ok(())
    }
}
