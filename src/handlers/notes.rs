use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::models::{
    CreateNoteRequest, ErrorResponse, Note, NoteFields, NoteSummary, UpdateNoteRequest,
};
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: message,
        }),
    )
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

/// Create a new note
pub async fn create_note(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Title is required".to_string(),
        ));
    }

    let note = app_state
        .store
        .create(title, &payload.content, &payload.last_edited_by)
        .await
        .map_err(|e| {
            error!("Error creating note: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create note".to_string(),
            )
        })?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// Get note by ID
pub async fn get_note(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = app_state.store.load(id).await.map_err(|e| {
        error!("Error fetching note {}: {}", id, e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch note".to_string(),
        )
    })?;

    match note {
        Some(note) => Ok(Json(note)),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "Note not found".to_string(),
        )),
    }
}

/// Update note content
pub async fn update_note(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let fields = NoteFields {
        title: payload.title.as_ref().map(|t| t.trim().to_string()),
        content: payload.content.clone(),
        tags: payload.tags.clone(),
    };

    let note = app_state
        .store
        .apply_update(id, &fields, &payload.last_edited_by)
        .await
        .map_err(|e| {
            error!("Error updating note {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update note".to_string(),
            )
        })?;

    match note {
        Some(note) => Ok(Json(note)),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "Note not found".to_string(),
        )),
    }
}

/// Get all notes (for listing)
pub async fn list_notes(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<NoteSummary>>, ApiError> {
    let notes = app_state.store.list_recent().await.map_err(|e| {
        error!("Error fetching notes: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch notes".to_string(),
        )
    })?;
    Ok(Json(notes))
}

/// Search notes by title, content or tags
pub async fn search_notes(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<NoteSummary>>, ApiError> {
    let q = query.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Search query is required".to_string(),
        ));
    }

    let notes = app_state.store.search(q).await.map_err(|e| {
        error!("Error searching notes: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to search notes".to_string(),
        )
    })?;
    Ok(Json(notes))
}

/// Toggle the pin flag of a note
pub async fn toggle_pin(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = app_state.store.toggle_pin(id).await.map_err(|e| {
        error!("Error toggling pin for note {}: {}", id, e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to toggle pin".to_string(),
        )
    })?;

    match note {
        Some(note) => Ok(Json(note)),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "Note not found".to_string(),
        )),
    }
}
