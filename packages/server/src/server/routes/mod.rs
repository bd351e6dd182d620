// HTTP routes
pub mod capture;
pub mod health;
pub mod run;
pub mod status;

pub use capture::*;
pub use health::*;
pub use run::*;
pub use status::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON error body with a status code.
pub(crate) fn error_response(status: StatusCode, error: impl ToString) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}
