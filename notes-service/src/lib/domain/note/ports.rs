use async_trait::async_trait;

use crate::domain::auth::models::UserId;
use crate::domain::note::errors::NoteError;
use crate::domain::note::models::CreateNoteCommand;
use crate::domain::note::models::Note;
use crate::domain::note::models::NoteId;
use crate::domain::note::models::UpdateNoteCommand;

/// Port for note operations. Every operation is scoped to the owning user.
#[async_trait]
pub trait NoteServicePort: Send + Sync + 'static {
    /// Create a note. At least one of title and body must be non-blank.
    ///
    /// # Errors
    /// * `Validation` - both title and body are blank
    /// * `DatabaseError` - the store failed
    async fn create_note(&self, user_id: UserId, command: CreateNoteCommand)
        -> Result<Note, NoteError>;

    /// Retrieve one of the user's notes.
    ///
    /// # Errors
    /// * `NotFound` - no such note for this user
    /// * `DatabaseError` - the store failed
    async fn get_note(&self, user_id: UserId, note_id: NoteId) -> Result<Note, NoteError>;

    /// Retrieve all of the user's notes.
    ///
    /// # Errors
    /// * `DatabaseError` - the store failed
    async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, NoteError>;

    /// Update one of the user's notes.
    ///
    /// # Errors
    /// * `Validation` - non-positive note id, or both fields blank
    /// * `NotFound` - no such note for this user
    /// * `DatabaseError` - the store failed
    async fn update_note(&self, user_id: UserId, command: UpdateNoteCommand)
        -> Result<Note, NoteError>;

    /// Delete one of the user's notes.
    ///
    /// # Errors
    /// * `NotFound` - no such note for this user
    /// * `DatabaseError` - the store failed
    async fn delete_note(&self, user_id: UserId, note_id: NoteId) -> Result<(), NoteError>;
}

/// Persistence operations for notes.
#[async_trait]
pub trait NoteRepository: Send + Sync + 'static {
    /// Persist a new note and return it with generated fields.
    async fn create(&self, user_id: UserId, title: &str, body: &str) -> Result<Note, NoteError>;

    /// Retrieve a note by id, scoped to its owner.
    async fn find_by_id(&self, note_id: NoteId, user_id: UserId)
        -> Result<Option<Note>, NoteError>;

    /// Retrieve all notes of a user, newest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Note>, NoteError>;

    /// Update a note scoped to its owner; None when it does not exist.
    async fn update(
        &self,
        note_id: NoteId,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> Result<Option<Note>, NoteError>;

    /// Delete a note scoped to its owner; false when it does not exist.
    async fn delete(&self, note_id: NoteId, user_id: UserId) -> Result<bool, NoteError>;
}
