use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::StoreError;

/// Response for an error
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub error: String,
}

/// Failures a collaboration operation can report back to its sender.
/// None of these trigger a broadcast or a partial mutation.
#[derive(Debug)]
pub enum CollabError {
    /// The note does not exist in the store
    NotFound,
    /// The connection is not currently joined to the note's room
    Unauthorized,
    /// Transient failure from the persistence layer
    Store(StoreError),
}

impl std::fmt::Display for CollabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollabError::NotFound => write!(f, "Note not found"),
            CollabError::Unauthorized => write!(f, "Not authorized to edit this note"),
            // Clients get the generic message; the underlying cause is
            // logged server-side where the failure is handled.
            CollabError::Store(_) => write!(f, "Failed to update note"),
        }
    }
}

impl std::error::Error for CollabError {}

impl From<StoreError> for CollabError {
    fn from(e: StoreError) -> Self {
        CollabError::Store(e)
    }
}
