//! PDF fetcher for direct `.pdf` links and arXiv papers.
//!
//! Text extraction shells out to `pdftotext` (poppler-utils) behind the
//! [`PdfExtractor`] trait so tests can swap in a fake.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;
use crate::types::content::FetchedContent;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Minimum extracted text for the PDF to count as readable.
const MIN_TEXT_CHARS: usize = 100;

/// Turns PDF bytes into plain text, pages separated by form feeds.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    async fn extract_text(&self, pdf: &[u8]) -> FetchResult<String>;
}

/// Extracts text with the `pdftotext` command.
#[derive(Debug, Clone)]
pub struct Pdftotext {
    program: String,
    timeout: Duration,
}

impl Default for Pdftotext {
    fn default() -> Self {
        Self {
            program: "pdftotext".to_string(),
            timeout: EXTRACT_TIMEOUT,
        }
    }
}

impl Pdftotext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PdfExtractor for Pdftotext {
    async fn extract_text(&self, pdf: &[u8]) -> FetchResult<String> {
        // pdftotext reads from a file path, not stdin
        let mut tmpfile = NamedTempFile::new()
            .map_err(|e| FetchError::DownloadFailed(format!("temp file: {}", e)))?;
        tmpfile
            .write_all(pdf)
            .map_err(|e| FetchError::DownloadFailed(format!("temp file: {}", e)))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(tmpfile.path()).arg("-").kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| FetchError::Timeout(format!("{} after {}s", self.program, self.timeout.as_secs())))?
            .map_err(|e| FetchError::DownloadFailed(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "pdftotext failed");
            return Err(FetchError::NoContent);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Downloads PDFs and extracts their text.
pub struct PdfFetcher {
    client: reqwest::Client,
    extractor: Box<dyn PdfExtractor>,
}

impl PdfFetcher {
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::DownloadFailed(e.to_string()))?;

        Ok(Self {
            client,
            extractor: Box::new(Pdftotext::new()),
        })
    }

    /// Replace the text extractor.
    pub fn with_extractor(mut self, extractor: impl PdfExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Use a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Whether `url` points at a PDF or an arXiv paper.
    pub fn is_pdf_url(url: &str) -> bool {
        let Ok(parsed) = Url::parse(&url.to_lowercase()) else {
            return false;
        };
        let path = parsed.path();
        if path.ends_with(".pdf") {
            return true;
        }

        let is_arxiv = parsed
            .host_str()
            .map(|h| h.contains("arxiv.org"))
            .unwrap_or(false);
        is_arxiv && (path.contains("/abs/") || path.contains("/pdf/"))
    }

    /// Rewrite arXiv abstract pages to their PDF: `/abs/X` becomes `/pdf/X.pdf`.
    pub fn pdf_url(url: &str) -> String {
        if url.contains("arxiv.org") && url.contains("/abs/") {
            format!("{}.pdf", url.replace("/abs/", "/pdf/"))
        } else {
            url.to_string()
        }
    }

    /// First substantial line among the first five of page one.
    pub fn guess_title(text: &str) -> Option<String> {
        let first_page = text.split('\x0c').next().unwrap_or("");
        first_page
            .trim()
            .lines()
            .take(5)
            .map(str::trim)
            .find(|line| {
                let len = line.chars().count();
                len > 10 && len < 200
            })
            .map(str::to_string)
    }

    async fn download(&self, pdf_url: &str) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(pdf_url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(pdf_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::DownloadFailed(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(pdf_url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Fetcher for PdfFetcher {
    fn accepts(&self, url: &str) -> bool {
        Self::is_pdf_url(url)
    }

    async fn fetch(&self, url: &str) -> FetchResult<FetchedContent> {
        let pdf_url = Self::pdf_url(url);
        debug!(url = %url, pdf_url = %pdf_url, "Downloading PDF");

        let data = self.download(&pdf_url).await?;
        if !data.starts_with(b"%PDF") {
            warn!(url = %url, "Response is not a PDF (missing %PDF header)");
            return Err(FetchError::NoContent);
        }

        let text = self.extractor.extract_text(&data).await?;
        let pages: Vec<&str> = text
            .split('\x0c')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let body = pages.join("\n\n");

        if body.chars().count() < MIN_TEXT_CHARS {
            warn!(url = %url, chars = body.chars().count(), "PDF yielded too little text");
            return Err(FetchError::NoContent);
        }

        let title = Self::guess_title(&text);
        let header = format!(
            "# {}\n\n**Pages:** {}\n**Source:** {}\n\n---\n\n",
            title.as_deref().unwrap_or("PDF Document"),
            pages.len(),
            url
        );

        let mut content = FetchedContent::new(header + &body);
        content.title = title;
        Ok(content)
    }

    fn name(&self) -> &str {
        "pdf"
    }
}
