//! Generic web page fetcher - the catch-all strategy.
//!
//! This implementation:
//! - Uses reqwest for HTTP requests
//! - Uses scraper for HTML parsing and metadata (title, author, date)
//! - Uses htmd for HTML to Markdown conversion
//!
//! Limitations:
//! - No JavaScript rendering (use for static HTML pages only)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;
use crate::types::content::FetchedContent;

// Use a browser-like User-Agent to avoid bot detection
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a page over HTTP and extracts its main content as Markdown.
///
/// Accepts every URL, so it belongs last in the dispatcher.
pub struct WebFetcher {
    client: reqwest::Client,
}

impl WebFetcher {
    pub fn new() -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::DownloadFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// Use a custom HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch raw HTML from a URL
    async fn fetch_html(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::DownloadFailed(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Parse a document into content and metadata.
    pub fn extract(html: &str) -> FetchedContent {
        let document = Html::parse_document(html);
        let main_content = Self::extract_main_content(&document);

        FetchedContent {
            content: Self::html_to_markdown(&main_content),
            title: Self::extract_title(&document),
            author: Self::extract_author(&document),
            date: Self::extract_date(&document),
        }
    }

    /// First non-empty `attr` value among `selectors`.
    fn first_attr(document: &Html, selectors: &[&str], attr: &str) -> Option<String> {
        selectors.iter().find_map(|selector_str| {
            let selector = Selector::parse(selector_str).ok()?;
            document
                .select(&selector)
                .filter_map(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        })
    }

    /// Title from Open Graph, falling back to `<title>`.
    fn extract_title(document: &Html) -> Option<String> {
        Self::first_attr(document, &["meta[property='og:title']"], "content").or_else(|| {
            let title_selector = Selector::parse("title").ok()?;
            document
                .select(&title_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        })
    }

    fn extract_author(document: &Html) -> Option<String> {
        Self::first_attr(
            document,
            &[
                "meta[name='author']",
                "meta[property='article:author']",
                "meta[name='twitter:creator']",
            ],
            "content",
        )
    }

    fn extract_date(document: &Html) -> Option<String> {
        Self::first_attr(
            document,
            &[
                "meta[property='article:published_time']",
                "meta[name='date']",
                "meta[itemprop='datePublished']",
            ],
            "content",
        )
        .or_else(|| Self::first_attr(document, &["time[datetime]"], "datetime"))
    }

    /// Extract main content HTML, stripping nav/header/footer/aside
    fn extract_main_content(document: &Html) -> String {
        let main_selectors = [
            "main",
            "article",
            "[role='main']",
            "#content",
            "#main",
            ".content",
            ".main",
            ".post-content",
            ".entry-content",
        ];

        for selector_str in main_selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(main) = document.select(&selector).next() {
                    return Self::remove_boilerplate(&main.html());
                }
            }
        }

        if let Ok(body_selector) = Selector::parse("body") {
            if let Some(body) = document.select(&body_selector).next() {
                return Self::remove_boilerplate(&body.html());
            }
        }

        document.html()
    }

    /// Remove common boilerplate elements from an HTML fragment
    fn remove_boilerplate(html: &str) -> String {
        let document = Html::parse_fragment(html);
        let unwanted = [
            "nav",
            "header",
            "footer",
            "aside",
            ".sidebar",
            ".menu",
            ".advertisement",
            ".ads",
            "script",
            "style",
            "noscript",
            "iframe",
            "form",
        ];

        let mut result = html.to_string();
        for selector_str in unwanted {
            if let Ok(selector) = Selector::parse(selector_str) {
                for element in document.select(&selector) {
                    result = result.replace(&element.html(), "");
                }
            }
        }

        result
    }

    /// Convert HTML to Markdown
    fn html_to_markdown(html: &str) -> String {
        htmd::convert(html)
            .unwrap_or_else(|_| {
                // Fallback: strip tags and return plain text
                let document = Html::parse_fragment(html);
                document.root_element().text().collect::<String>()
            })
            .trim()
            .to_string()
    }
}

#[async_trait]
impl Fetcher for WebFetcher {
    fn accepts(&self, _url: &str) -> bool {
        true
    }

    async fn fetch(&self, url: &str) -> FetchResult<FetchedContent> {
        debug!(url = %url, "Fetching web page");
        let html = self.fetch_html(url).await?;
        let content = Self::extract(&html);

        if content.content.is_empty() {
            warn!(url = %url, "Page has no extractable content");
            return Err(FetchError::NoContent);
        }

        Ok(content)
    }

    fn name(&self) -> &str {
        "web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTICLE: &str = r#"
        <html>
          <head>
            <title>Fallback Title</title>
            <meta property="og:title" content="Open Graph Title">
            <meta name="author" content="Jane Roe">
            <meta property="article:published_time" content="2024-03-01">
          </head>
          <body>
            <nav><a href="/">Home</a></nav>
            <article>
              <h1>Heading</h1>
              <p>First paragraph of the article.</p>
              <script>trackVisitor();</script>
            </article>
            <footer>Copyright</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_extract_prefers_open_graph_title() {
        let content = WebFetcher::extract(ARTICLE);

        assert_eq!(content.title.as_deref(), Some("Open Graph Title"));
        assert_eq!(content.author.as_deref(), Some("Jane Roe"));
        assert_eq!(content.date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_extract_keeps_article_and_drops_boilerplate() {
        let content = WebFetcher::extract(ARTICLE);

        assert!(content.content.contains("Heading"));
        assert!(content.content.contains("First paragraph of the article."));
        assert!(!content.content.contains("trackVisitor"));
        assert!(!content.content.contains("Copyright"));
        assert!(!content.content.contains("Home"));
    }

    #[test]
    fn test_extract_title_falls_back_to_title_tag() {
        let html = "<html><head><title> Plain </title></head><body><p>x</p></body></html>";
        let content = WebFetcher::extract(html);

        assert_eq!(content.title.as_deref(), Some("Plain"));
        assert_eq!(content.author, None);
    }

    #[test]
    fn test_extract_date_from_time_element() {
        let html = r#"<html><body><main><time datetime="2023-11-05T10:00:00Z">Nov 5</time><p>Body</p></main></body></html>"#;
        let content = WebFetcher::extract(html);

        assert_eq!(content.date.as_deref(), Some("2023-11-05T10:00:00Z"));
    }

    #[test]
    fn test_accepts_everything() {
        let fetcher = WebFetcher::new().unwrap();
        assert!(fetcher.accepts("https://anything.example/path"));
        assert!(fetcher.accepts("not even a url"));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
            .mount(&server)
            .await;

        let fetcher = WebFetcher::new().unwrap();
        let content = fetcher.fetch(&format!("{}/post", server.uri())).await.unwrap();

        assert!(content.content.contains("First paragraph"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = WebFetcher::new().unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, FetchError::DownloadFailed(ref reason) if reason.contains("404")));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ARTICLE)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let fetcher = WebFetcher::with_client(client);
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout(_)));
    }
}
