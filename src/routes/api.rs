use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    create_note, get_note, health_check, list_notes, search_notes, toggle_pin, update_note,
};
use crate::AppState;

/// Create API routes
pub fn create_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/notes", post(create_note).get(list_notes))
        .route("/notes/search", get(search_notes))
        .route("/notes/:id", get(get_note).put(update_note))
        .route("/notes/:id/pin", patch(toggle_pin))
}
