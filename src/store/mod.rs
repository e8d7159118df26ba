pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Note, NoteFields, NoteSummary};

/// Transient failure from the persistence layer
#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Persistence boundary for notes.
///
/// The collaboration core only ever calls `load` and `apply_update`; the
/// remaining operations serve the REST boundary. `apply_update` must be
/// atomic per note id and stamps `updated_at`/`last_edited_by` itself.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Load a note by id. `Ok(None)` means the note does not exist.
    async fn load(&self, id: Uuid) -> Result<Option<Note>, StoreError>;

    /// Apply only the supplied fields to a note, leaving the rest
    /// untouched, and stamp `updated_at`/`last_edited_by`.
    /// Returns the note as persisted, or `Ok(None)` if it does not exist.
    async fn apply_update(
        &self,
        id: Uuid,
        fields: &NoteFields,
        editor: &str,
    ) -> Result<Option<Note>, StoreError>;

    /// Create a new note. The title is expected to be validated upstream.
    async fn create(&self, title: &str, content: &str, author: &str) -> Result<Note, StoreError>;

    /// The 50 most recently updated notes, pinned notes first.
    async fn list_recent(&self) -> Result<Vec<NoteSummary>, StoreError>;

    /// Case-insensitive substring search over title, content and tags.
    async fn search(&self, query: &str) -> Result<Vec<NoteSummary>, StoreError>;

    /// Flip a note's pin flag. Does not count as an edit, so the
    /// `updated_at`/`last_edited_by` stamps are left alone.
    async fn toggle_pin(&self, id: Uuid) -> Result<Option<Note>, StoreError>;
}
