//! Typed errors for the capture pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Every per-item error
//! renders a short human-readable reason through `Display`; that text is what
//! ends up in the ledger.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a fetch strategy or the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Nothing usable came back (empty page, below the minimum length,
    /// no post found, not a PDF).
    #[error("No content extracted")]
    NoContent,

    /// Transport or HTTP-level failure.
    #[error("Could not download: {0}")]
    DownloadFailed(String),

    /// The request did not finish within the strategy's timeout.
    #[error("Timed out fetching {0}")]
    Timeout(String),
}

impl FetchError {
    /// Map a reqwest error, keeping timeouts distinct.
    pub fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(url.to_string())
        } else {
            Self::DownloadFailed(e.to_string())
        }
    }
}

/// Errors from the summarization collaborator.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Network failure, timeout, or non-2xx from the model API.
    #[error("{0}")]
    Transport(String),

    /// The response arrived but could not be used.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors while writing a note file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the capture log or ledger files.
///
/// Unlike the per-item errors these abort a run: once the ledger cannot be
/// appended to, the at-most-once guarantee is gone.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for summarization.
pub type SummarizeResult<T> = std::result::Result<T, SummarizeError>;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
