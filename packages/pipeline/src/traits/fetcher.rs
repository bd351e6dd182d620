//! Fetcher trait for pluggable content-fetch strategies.
//!
//! Each strategy claims a URL shape through [`Fetcher::accepts`] and turns
//! matching URLs into extracted text. Strategies never know about each
//! other; ordering and fallback belong to the dispatcher.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pipeline::traits::fetcher::Fetcher;
//!
//! if fetcher.accepts(url) {
//!     let content = fetcher.fetch(url).await?;
//! }
//! ```

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::content::FetchedContent;

/// A content-fetch strategy.
///
/// Implementations:
/// - `ForumFetcher` - LessWrong / Alignment Forum GraphQL API
/// - `PdfFetcher` - direct PDFs and arXiv papers
/// - `WebFetcher` - generic web pages (accepts everything)
/// - `MockFetcher` - canned responses for tests
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Whether this strategy knows how to handle `url`.
    fn accepts(&self, url: &str) -> bool;

    /// Fetch and extract content from `url`.
    ///
    /// Only called for URLs this strategy accepts.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedContent>;

    /// Get the strategy name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
