//! Fetcher implementations for the supported content sources.
//!
//! # Available Fetchers
//!
//! - `ForumFetcher` - LessWrong / Alignment Forum posts via GraphQL
//! - `PdfFetcher` - direct PDFs and arXiv papers (text via `pdftotext`)
//! - `WebFetcher` - any web page (catch-all)
//! - `MockFetcher` - For testing
//!
//! # Example
//!
//! ```rust,ignore
//! use pipeline::fetchers::WebFetcher;
//! use pipeline::traits::fetcher::Fetcher;
//!
//! let fetcher = WebFetcher::new()?;
//! let content = fetcher.fetch("https://example.com").await?;
//! ```

mod forum;
mod mock;
mod pdf;
mod web;

pub use forum::{ForumFetcher, PostKey};
pub use mock::MockFetcher;
pub use pdf::{PdfExtractor, PdfFetcher, Pdftotext};
pub use web::WebFetcher;

// Re-export from traits for convenience
pub use crate::traits::fetcher::Fetcher;
