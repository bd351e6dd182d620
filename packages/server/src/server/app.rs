use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use pipeline::JsonlStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::PipelineLauncher;
use crate::server::routes::{capture_handler, health_handler, run_handler, status_handler};

/// Shared state for the control surface handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonlStore>,
    pub launcher: PipelineLauncher,
}

impl AppState {
    pub fn new(store: JsonlStore, launcher: PipelineLauncher) -> Self {
        Self {
            store: Arc::new(store),
            launcher,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    // Permissive CORS so the browser extension can post captures
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/run", post(run_handler))
        .route("/status", get(status_handler))
        .route("/capture", post(capture_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
