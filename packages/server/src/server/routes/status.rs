use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashSet;

use pipeline::{CaptureRecord, CaptureStore, Ledger};
use serde::Serialize;

use crate::server::app::AppState;
use crate::server::routes::error_response;

/// Captures shown in the status snapshot.
pub const RECENT_CAPTURES: usize = 5;

#[derive(Serialize)]
pub struct StatusResponse {
    /// Distinct URLs not yet in the ledger.
    pub pending: usize,
    /// Latest captures, newest first.
    pub recent: Vec<CaptureRecord>,
    pub pipeline_running: bool,
    pub last_run: Option<String>,
    pub last_result: Option<String>,
}

/// Pending count, recent captures and launcher state.
pub async fn status_handler(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let loaded = match state.store.load_captures().await {
        Ok(loaded) => loaded,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e).into_response(),
    };
    let seen = match state.store.seen_urls().await {
        Ok(seen) => seen,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e).into_response(),
    };

    let pending_count = loaded
        .items
        .iter()
        .map(|c| c.url.as_str())
        .filter(|url| !seen.contains(*url))
        .collect::<HashSet<_>>()
        .len();
    let recent = loaded
        .items
        .iter()
        .rev()
        .take(RECENT_CAPTURES)
        .cloned()
        .collect();
    let run = state.launcher.status();

    Json(StatusResponse {
        pending: pending_count,
        recent,
        pipeline_running: run.running,
        last_run: run.last_run,
        last_result: run.last_result,
    })
    .into_response()
}
