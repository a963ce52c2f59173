use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::auth::models::UserId;
use crate::domain::note::errors::NoteError;
use crate::domain::note::models::Note;
use crate::domain::note::models::NoteId;
use crate::domain::note::ports::NoteRepository;

pub struct PostgresNoteRepository {
    pool: PgPool,
}

impl PostgresNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> NoteError {
    NoteError::DatabaseError(e.to_string())
}

#[derive(FromRow)]
struct NoteRow {
    note_id: i32,
    user_id: i32,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            note_id: NoteId::new(row.note_id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl NoteRepository for PostgresNoteRepository {
    async fn create(&self, user_id: UserId, title: &str, body: &str) -> Result<Note, NoteError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (user_id, title, body)
            VALUES ($1, $2, $3)
            RETURNING note_id, user_id, title, body, created_at, updated_at
            "#,
        )
        .bind(user_id.value())
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.into())
    }

    async fn find_by_id(
        &self,
        note_id: NoteId,
        user_id: UserId,
    ) -> Result<Option<Note>, NoteError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT note_id, user_id, title, body, created_at, updated_at
            FROM notes
            WHERE note_id = $1 AND user_id = $2
            "#,
        )
        .bind(note_id.value())
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(Note::from))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Note>, NoteError> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT note_id, user_id, title, body, created_at, updated_at
            FROM notes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn update(
        &self,
        note_id: NoteId,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> Result<Option<Note>, NoteError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET title = $3, body = $4, updated_at = now()
            WHERE note_id = $1 AND user_id = $2
            RETURNING note_id, user_id, title, body, created_at, updated_at
            "#,
        )
        .bind(note_id.value())
        .bind(user_id.value())
        .bind(title)
        .bind(body)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(Note::from))
    }

    async fn delete(&self, note_id: NoteId, user_id: UserId) -> Result<bool, NoteError> {
        let result = sqlx::query("DELETE FROM notes WHERE note_id = $1 AND user_id = $2")
            .bind(note_id.value())
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
