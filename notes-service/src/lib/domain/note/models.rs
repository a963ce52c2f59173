use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::models::UserId;

/// Note unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId(pub i32);

impl NoteId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Note aggregate entity, always owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Note {
    pub note_id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command to create a new note
#[derive(Debug)]
pub struct CreateNoteCommand {
    pub title: String,
    pub body: String,
}

/// Command to update an existing note
#[derive(Debug)]
pub struct UpdateNoteCommand {
    pub note_id: NoteId,
    pub title: String,
    pub body: String,
}
