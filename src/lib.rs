pub mod collab;
pub mod config;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod websocket;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use collab::coordinator::UpdateCoordinator;
use collab::registry::RoomRegistry;
use collab::typing::TypingRelay;
use store::NoteStore;

/// Shared application state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub registry: Arc<RoomRegistry>,
    pub coordinator: UpdateCoordinator,
    pub typing: TypingRelay,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>) -> Arc<Self> {
        let registry = Arc::new(RoomRegistry::new());
        let coordinator = UpdateCoordinator::new(registry.clone(), store.clone());
        let typing = TypingRelay::new(registry.clone());
        Arc::new(Self {
            store,
            registry,
            coordinator,
            typing,
        })
    }
}

/// Build the full application router: REST API under /api, the
/// collaboration socket at /ws, and Swagger UI at /swagger.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", routes::create_api_routes())
        .route("/ws", get(websocket::handler::websocket_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
