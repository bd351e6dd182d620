//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the Fetcher trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;
use crate::types::content::FetchedContent;

/// Mock fetcher for testing.
///
/// Returns canned content or errors per URL and records every fetch.
/// Clones share state, so a test can keep a handle after handing the
/// fetcher to a dispatcher.
///
/// # Example
///
/// ```rust
/// use pipeline::fetchers::MockFetcher;
/// use pipeline::types::content::FetchedContent;
///
/// let mock = MockFetcher::new("mock")
///     .with_content("https://example.com", FetchedContent::new("Hello"));
/// ```
#[derive(Clone)]
pub struct MockFetcher {
    name: String,
    /// URL prefixes this fetcher claims; empty means everything
    prefixes: Vec<String>,
    responses: Arc<RwLock<HashMap<String, FetchResult<FetchedContent>>>>,
    fallback: Option<FetchResult<FetchedContent>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a mock that accepts every URL and has no canned responses.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefixes: Vec::new(),
            responses: Arc::new(RwLock::new(HashMap::new())),
            fallback: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Only accept URLs starting with `prefix` (may be called repeatedly).
    pub fn accepting(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Return `content` for `url`.
    pub fn with_content(self, url: impl Into<String>, content: FetchedContent) -> Self {
        self.responses.write().unwrap().insert(url.into(), Ok(content));
        self
    }

    /// Fail `url` with `error`.
    pub fn with_error(self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.write().unwrap().insert(url.into(), Err(error));
        self
    }

    /// Response for URLs without a canned entry (default: `NoContent`).
    pub fn with_fallback(mut self, result: FetchResult<FetchedContent>) -> Self {
        self.fallback = Some(result);
        self
    }

    /// Get the URLs that were fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Get the number of fetches.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn accepts(&self, url: &str) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }

    async fn fetch(&self, url: &str) -> FetchResult<FetchedContent> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(result) = self.responses.read().unwrap().get(url) {
            return result.clone();
        }

        self.fallback
            .clone()
            .unwrap_or(Err(FetchError::NoContent))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_canned_content() {
        let mock = MockFetcher::new("mock")
            .with_content("https://a.example", FetchedContent::new("A"))
            .with_error("https://b.example", FetchError::Timeout("https://b.example".into()));

        assert_eq!(mock.fetch("https://a.example").await.unwrap().content, "A");
        assert!(matches!(
            mock.fetch("https://b.example").await,
            Err(FetchError::Timeout(_))
        ));
        assert_eq!(mock.fetch("https://c.example").await, Err(FetchError::NoContent));
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn test_mock_accept_prefixes() {
        let mock = MockFetcher::new("forum").accepting("https://www.lesswrong.com/");

        assert!(mock.accepts("https://www.lesswrong.com/posts/x"));
        assert!(!mock.accepts("https://example.com"));
        assert!(MockFetcher::new("any").accepts("anything"));
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let mock = MockFetcher::new("mock");
        let handle = mock.clone();

        let _ = mock.fetch("https://x.example").await;

        assert_eq!(handle.calls(), vec!["https://x.example".to_string()]);
    }
}
