use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct RunResponse {
    pub started: bool,
}

/// Start a pipeline run unless one is already in flight.
pub async fn run_handler(Extension(state): Extension<AppState>) -> Json<RunResponse> {
    Json(RunResponse {
        started: state.launcher.try_start(),
    })
}
