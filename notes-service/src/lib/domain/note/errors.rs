use thiserror::Error;

/// Top-level error for note operations
#[derive(Debug, Clone, Error)]
pub enum NoteError {
    #[error("{0}")]
    Validation(String),

    #[error("Note not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
