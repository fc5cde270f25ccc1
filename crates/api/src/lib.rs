pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pages;
pub mod pipeline;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use config::AppConfig;
pub use error::ProcessError;
pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.storage.static_dir);
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/extract", post(handlers::extract_json))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
