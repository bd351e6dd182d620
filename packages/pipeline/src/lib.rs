//! Capture-to-Note Pipeline Library
//!
//! Turns a log of captured URLs into summarized, tagged Markdown notes.
//!
//! # Design
//!
//! - Append-only capture log and ledger (JSONL); a URL in the ledger is never
//!   attempted again, whatever its outcome
//! - Pluggable fetch strategies tried in priority order
//! - Summarization behind a one-method [`LanguageModel`] trait
//! - One bad item never aborts the batch
//!
//! # Usage
//!
//! ```rust,ignore
//! use pipeline::{Dispatcher, JsonlStore, NoteWriter, Pipeline, SummaryGenerator};
//! use pipeline::testing::MockModel;
//!
//! let store = JsonlStore::new("/home/me/captured_tabs.jsonl");
//! let pipeline = Pipeline::new(
//!     store,
//!     Dispatcher::standard()?,
//!     SummaryGenerator::new(MockModel::new()),
//!     NoteWriter::new("/home/me/vault"),
//! );
//!
//! let report = pipeline.run().await?;
//! println!("{} succeeded, {} failed", report.succeeded, report.failed);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Fetcher, LanguageModel, CaptureStore, Ledger)
//! - [`types`] - Captures, ledger records, fetched content, summaries
//! - [`fetchers`] - Fetch strategies (forum, PDF, web)
//! - [`pipeline`] - Dispatcher, summary generator, note writer, runner
//! - [`stores`] - Storage implementations (JsonlStore, MemoryStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "anthropic")]
pub mod ai;

// Re-export core types at crate root
pub use error::{FetchError, LedgerError, SummarizeError, WriteError};
pub use traits::{
    fetcher::Fetcher,
    model::LanguageModel,
    store::{CaptureStore, Ledger, Loaded},
};
pub use types::{
    capture::CaptureRecord,
    content::{FetchedContent, NoteMetadata},
    ledger::{LedgerRecord, Status},
    summary::SummaryResult,
    warning::{ParseWarning, WarningSource},
};

// Re-export pipeline components
pub use pipeline::{
    extract_keywords, load_tag_library, pending, Dispatcher, ItemOutcome, NoteInput, NoteWriter,
    Pipeline, RunOptions, RunReport, SummaryGenerator,
};

// Re-export stores
pub use stores::{JsonlStore, MemoryStore};

// Re-export fetchers
pub use fetchers::{ForumFetcher, PdfFetcher, WebFetcher};

// Re-export testing utilities
pub use testing::MockModel;
