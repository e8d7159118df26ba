use noteroom::config::Config;
use noteroom::store::memory::MemoryNoteStore;
use noteroom::store::postgres::PgNoteStore;
use noteroom::store::NoteStore;
use noteroom::{build_app, AppState};
use std::panic;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "noteroom=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Pick the note store: Postgres when a database URL is configured,
    // otherwise an in-memory store that lives for the process only.
    let store: Arc<dyn NoteStore> = if let Some(db_url) = &config.db_url {
        match PgNoteStore::connect(db_url).await {
            Ok(store) => {
                info!("Database initialized successfully");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to initialize database: {}", e);
                warn!("Falling back to in-memory note store - notes will not survive a restart");
                Arc::new(MemoryNoteStore::new())
            }
        }
    } else {
        warn!("No database URL configured - using in-memory note store");
        Arc::new(MemoryNoteStore::new())
    };

    let state = AppState::new(store);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 Collaboration socket available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
