use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use pipeline::{CaptureRecord, CaptureStore};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::routes::error_response;

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct CaptureResponse {
    status: &'static str,
}

/// Append a capture to the log, stamped with the current time.
pub async fn capture_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CaptureRequest>,
) -> impl IntoResponse {
    let Some(url) = request.url.filter(|u| !u.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "url is required").into_response();
    };

    let record = CaptureRecord::new(url)
        .with_title(request.title.unwrap_or_default())
        .with_note(request.note.unwrap_or_default());

    match state.store.append_capture(&record).await {
        Ok(()) => {
            tracing::info!(url = %record.url, title = %record.title, "Captured");
            Json(CaptureResponse { status: "ok" }).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to append capture");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
