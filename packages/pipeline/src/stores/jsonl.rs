//! Line-delimited JSON storage.
//!
//! The capture log and the ledger are plain JSONL files so other tools (a
//! browser extension, a bookmark importer, `jq`) can read and append to
//! them. Appends go through `O_APPEND` and are synced before returning.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::traits::store::{CaptureStore, Ledger, Loaded};
use crate::types::{
    capture::CaptureRecord,
    ledger::LedgerRecord,
    warning::{ParseWarning, WarningSource},
};

/// Capture log and ledger backed by two JSONL files.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    capture_path: PathBuf,
    ledger_path: PathBuf,
}

impl JsonlStore {
    /// Create a store for `capture_path`, with the ledger next to it.
    pub fn new(capture_path: impl Into<PathBuf>) -> Self {
        let capture_path = capture_path.into();
        let ledger_path = Self::ledger_path_for(&capture_path);
        Self {
            capture_path,
            ledger_path,
        }
    }

    /// Override the ledger location.
    pub fn with_ledger_path(mut self, ledger_path: impl Into<PathBuf>) -> Self {
        self.ledger_path = ledger_path.into();
        self
    }

    /// `captured_tabs.jsonl` -> `captured_tabs.processed.jsonl`.
    pub fn ledger_path_for(capture_path: &Path) -> PathBuf {
        capture_path.with_extension("processed.jsonl")
    }

    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }
}

#[async_trait]
impl CaptureStore for JsonlStore {
    async fn load_captures(&self) -> LedgerResult<Loaded<CaptureRecord>> {
        read_jsonl(&self.capture_path, WarningSource::CaptureLog).await
    }

    async fn append_capture(&self, record: &CaptureRecord) -> LedgerResult<()> {
        append_line(&self.capture_path, record).await
    }
}

#[async_trait]
impl Ledger for JsonlStore {
    async fn load_ledger(&self) -> LedgerResult<Loaded<LedgerRecord>> {
        read_jsonl(&self.ledger_path, WarningSource::Ledger).await
    }

    async fn append(&self, record: &LedgerRecord) -> LedgerResult<()> {
        append_line(&self.ledger_path, record).await
    }
}

/// Read a JSONL file, skipping blank lines and collecting a warning for
/// every line that does not parse. A missing file reads as empty.
pub async fn read_jsonl<T: DeserializeOwned>(
    path: &Path,
    source: WarningSource,
) -> LedgerResult<Loaded<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "JSONL file does not exist yet");
            return Ok(Loaded::default());
        }
        Err(source) => {
            return Err(LedgerError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let mut loaded = Loaded::default();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(item) => loaded.items.push(item),
            Err(e) => {
                let warning = ParseWarning {
                    source,
                    line: index + 1,
                    message: e.to_string(),
                };
                warn!(path = %path.display(), %warning, "Skipping malformed line");
                loaded.warnings.push(warning);
            }
        }
    }

    Ok(loaded)
}

/// Append one JSON line and sync it to disk.
pub async fn append_line<T: Serialize + ?Sized>(path: &Path, record: &T) -> LedgerResult<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;
    file.write_all(line.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    file.sync_data().await.map_err(io_err)?;

    Ok(())
}
