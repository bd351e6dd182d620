//! Test harness for the control surface.
//!
//! Each harness owns a temporary capture log and ledger and an app wired to
//! them. Requests go straight through the router with `oneshot`, no socket.

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use pipeline::{CaptureRecord, CaptureStore, JsonlStore, Ledger, LedgerRecord};
use serde_json::Value;
use server_core::{
    kernel::PipelineLauncher,
    server::{build_app, AppState},
};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestHarness {
    _dir: TempDir,
    pub capture_file: PathBuf,
    pub store: JsonlStore,
    pub launcher: PipelineLauncher,
    pub app: Router,
}

impl TestHarness {
    /// Harness whose pipeline run is a one second `sleep`.
    pub fn new() -> Self {
        Self::with_launcher(
            PipelineLauncher::new("sleep", Duration::from_secs(10)).with_args(["1"]),
        )
    }

    pub fn with_launcher(launcher: PipelineLauncher) -> Self {
        let dir = TempDir::new().unwrap();
        let capture_file = dir.path().join("captured_tabs.jsonl");
        let store = JsonlStore::new(&capture_file);
        let app = build_app(AppState::new(store.clone(), launcher.clone()));

        Self {
            _dir: dir,
            capture_file,
            store,
            launcher,
            app,
        }
    }

    pub async fn capture(&self, record: CaptureRecord) {
        self.store.append_capture(&record).await.unwrap();
    }

    pub async fn record(&self, record: LedgerRecord) {
        self.store.append(&record).await.unwrap();
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
