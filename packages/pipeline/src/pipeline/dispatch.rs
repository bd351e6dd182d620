//! Content fetch dispatcher.
//!
//! Holds an ordered list of [`Fetcher`]s and tries every one that accepts a
//! URL until one returns usable content. Adding a source means registering
//! another fetcher; the dispatch loop never changes.

use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchResult};
use crate::fetchers::{ForumFetcher, PdfFetcher, WebFetcher};
use crate::traits::fetcher::Fetcher;
use crate::types::content::FetchedContent;

/// Content shorter than this (trimmed, in characters) is treated as nothing.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 100;

/// Ordered fetch strategies with fallback.
pub struct Dispatcher {
    fetchers: Vec<Box<dyn Fetcher>>,
    min_content_chars: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            fetchers: Vec::new(),
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
        }
    }

    /// The standard registry: forum, PDF, then the generic web fetcher.
    pub fn standard() -> FetchResult<Self> {
        Ok(Self::new()
            .register(ForumFetcher::new()?)
            .register(PdfFetcher::new()?)
            .register(WebFetcher::new()?))
    }

    /// Append a fetcher. Earlier registrations take priority.
    pub fn register(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetchers.push(Box::new(fetcher));
        self
    }

    pub fn with_min_content_chars(mut self, min: usize) -> Self {
        self.min_content_chars = min;
        self
    }

    /// Names of the registered fetchers, in priority order.
    pub fn fetcher_names(&self) -> Vec<&str> {
        self.fetchers.iter().map(|f| f.name()).collect()
    }

    /// Fetch `url` with the first accepting fetcher that succeeds.
    ///
    /// Returns the last failure when every accepting fetcher fails, or
    /// `NoContent` when none accepts.
    pub async fn fetch(&self, url: &str) -> FetchResult<FetchedContent> {
        let mut last_error = FetchError::NoContent;

        for fetcher in self.fetchers.iter().filter(|f| f.accepts(url)) {
            debug!(url = %url, fetcher = fetcher.name(), "Trying fetcher");

            match fetcher.fetch(url).await {
                Ok(content) if content.trimmed_len() >= self.min_content_chars => {
                    info!(
                        url = %url,
                        fetcher = fetcher.name(),
                        chars = content.trimmed_len(),
                        "Fetched content"
                    );
                    return Ok(content);
                }
                Ok(content) => {
                    debug!(
                        url = %url,
                        fetcher = fetcher.name(),
                        chars = content.trimmed_len(),
                        "Content below minimum, trying next fetcher"
                    );
                    last_error = FetchError::NoContent;
                }
                Err(e) => {
                    warn!(url = %url, fetcher = fetcher.name(), error = %e, "Fetcher failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;

    const URL: &str = "https://www.lesswrong.com/posts/abc/slug";

    fn long_text() -> FetchedContent {
        FetchedContent::new("x".repeat(150))
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = MockFetcher::new("first").with_content(URL, long_text());
        let second = MockFetcher::new("second").with_content(URL, long_text());
        let dispatcher = Dispatcher::new()
            .register(first.clone())
            .register(second.clone());

        dispatcher.fetch(URL).await.unwrap();

        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 0);
    }

    #[tokio::test]
    async fn test_skips_fetchers_that_do_not_accept() {
        let pdf = MockFetcher::new("pdf").accepting("https://arxiv.org/");
        let web = MockFetcher::new("web").with_content(URL, long_text());
        let dispatcher = Dispatcher::new().register(pdf.clone()).register(web);

        dispatcher.fetch(URL).await.unwrap();

        assert_eq!(pdf.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_content_falls_through() {
        let forum = MockFetcher::new("forum").with_content(URL, FetchedContent::new("too short"));
        let web = MockFetcher::new("web").with_content(URL, long_text().with_title("Web"));
        let dispatcher = Dispatcher::new().register(forum).register(web.clone());

        let content = dispatcher.fetch(URL).await.unwrap();

        assert_eq!(content.title.as_deref(), Some("Web"));
        assert_eq!(web.call_count(), 1);
    }

    #[tokio::test]
    async fn test_error_falls_through_to_next() {
        let forum = MockFetcher::new("forum")
            .with_error(URL, FetchError::DownloadFailed("HTTP 403".into()));
        let web = MockFetcher::new("web").with_content(URL, long_text());
        let dispatcher = Dispatcher::new().register(forum).register(web);

        assert!(dispatcher.fetch(URL).await.is_ok());
    }

    #[tokio::test]
    async fn test_all_fail_returns_last_error() {
        let forum = MockFetcher::new("forum")
            .with_error(URL, FetchError::DownloadFailed("HTTP 403".into()));
        let web = MockFetcher::new("web").with_error(URL, FetchError::Timeout(URL.into()));
        let dispatcher = Dispatcher::new().register(forum).register(web);

        assert_eq!(
            dispatcher.fetch(URL).await,
            Err(FetchError::Timeout(URL.into()))
        );
    }

    #[tokio::test]
    async fn test_nothing_accepts_is_no_content() {
        let pdf = MockFetcher::new("pdf").accepting("https://arxiv.org/");
        let dispatcher = Dispatcher::new().register(pdf);

        assert_eq!(dispatcher.fetch(URL).await, Err(FetchError::NoContent));
        assert_eq!(Dispatcher::new().fetch(URL).await, Err(FetchError::NoContent));
    }

    #[tokio::test]
    async fn test_min_content_threshold_is_configurable() {
        let web = MockFetcher::new("web").with_content(URL, FetchedContent::new("tiny"));
        let dispatcher = Dispatcher::new().register(web).with_min_content_chars(3);

        assert_eq!(dispatcher.fetch(URL).await.unwrap().content, "tiny");
    }

    #[test]
    fn test_standard_order() {
        let dispatcher = Dispatcher::standard().unwrap();
        assert_eq!(dispatcher.fetcher_names(), vec!["forum", "pdf", "web"]);
    }
}
