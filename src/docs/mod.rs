use utoipa::OpenApi;

use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Create a new note
#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = Note),
        (status = 400, description = "Title is missing or blank", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_note_doc() {}

/// List the most recently updated notes
#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "Up to 50 note summaries, pinned first", body = [NoteSummary])
    )
)]
#[allow(dead_code)]
pub async fn list_notes_doc() {}

/// Search notes by title, content or tags
#[utoipa::path(
    get,
    path = "/api/notes/search",
    params(
        ("q" = String, Query, description = "Search term")
    ),
    responses(
        (status = 200, description = "Matching note summaries", body = [NoteSummary]),
        (status = 400, description = "Missing search term", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn search_notes_doc() {}

/// Fetch a note by id
#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Note id")
    ),
    responses(
        (status = 200, description = "The note", body = Note),
        (status = 404, description = "Note not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_note_doc() {}

/// Partially update a note
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    request_body = UpdateNoteRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Note id")
    ),
    responses(
        (status = 200, description = "The updated note", body = Note),
        (status = 404, description = "Note not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_note_doc() {}

/// Toggle a note's pin flag
#[utoipa::path(
    patch,
    path = "/api/notes/{id}/pin",
    params(
        ("id" = uuid::Uuid, Path, description = "Note id")
    ),
    responses(
        (status = 200, description = "The note with its pin flag flipped", body = Note),
        (status = 404, description = "Note not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn toggle_pin_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        create_note_doc,
        list_notes_doc,
        search_notes_doc,
        get_note_doc,
        update_note_doc,
        toggle_pin_doc,
    ),
    components(
        schemas(HealthResponse, Note, NoteSummary, NoteFields, CreateNoteRequest, UpdateNoteRequest, ErrorResponse)
    ),
    tags(
        (name = "api", description = "Note API endpoints")
    )
)]
pub struct ApiDoc;
