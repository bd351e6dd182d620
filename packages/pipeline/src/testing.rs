//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline library
//! without making real model or network calls. See also
//! [`MockFetcher`](crate::fetchers::MockFetcher).

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::{SummarizeError, SummarizeResult};
use crate::traits::model::LanguageModel;

/// Response used when nothing more specific is configured.
pub const DEFAULT_MOCK_RESPONSE: &str = "TAGS: mock\n---\nMock summary.";

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Transport(String),
    Malformed(String),
}

impl Reply {
    fn to_result(&self) -> SummarizeResult<String> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Transport(reason) => Err(SummarizeError::Transport(reason.clone())),
            Self::Malformed(reason) => Err(SummarizeError::MalformedResponse(reason.clone())),
        }
    }
}

/// A mock language model for testing.
///
/// Replies are chosen by the URL embedded in the prompt, falling back to a
/// default reply. Every prompt is recorded. Clones share state.
#[derive(Clone)]
pub struct MockModel {
    default: Reply,
    by_url: Arc<RwLock<Vec<(String, Reply)>>>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self {
            default: Reply::Text(DEFAULT_MOCK_RESPONSE.to_string()),
            by_url: Arc::new(RwLock::new(Vec::new())),
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl MockModel {
    /// Create a new mock model answering [`DEFAULT_MOCK_RESPONSE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every prompt with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.default = Reply::Text(response.into());
        self
    }

    /// Fail every prompt with a transport error.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.default = Reply::Transport(reason.into());
        self
    }

    /// Answer prompts for `url` with `response`.
    pub fn with_response_for(self, url: impl Into<String>, response: impl Into<String>) -> Self {
        self.push(url.into(), Reply::Text(response.into()));
        self
    }

    /// Fail prompts for `url` with a transport error.
    pub fn failing_for(self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.push(url.into(), Reply::Transport(reason.into()));
        self
    }

    /// Fail prompts for `url` with a malformed-response error.
    pub fn malformed_for(self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.push(url.into(), Reply::Malformed(reason.into()));
        self
    }

    fn push(&self, url: String, reply: Reply) {
        self.by_url.write().unwrap().push((url, reply));
    }

    /// Get all prompts sent to this mock.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }

    /// Get the number of calls.
    pub fn call_count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }

    /// Whether any prompt mentioned `url`.
    pub fn was_called_for(&self, url: &str) -> bool {
        let needle = format!("URL: {}\n", url);
        self.prompts.read().unwrap().iter().any(|p| p.contains(&needle))
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, prompt: &str) -> SummarizeResult<String> {
        self.prompts.write().unwrap().push(prompt.to_string());

        let by_url = self.by_url.read().unwrap();
        let reply = by_url
            .iter()
            .find(|(url, _)| prompt.contains(&format!("URL: {}\n", url)))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default);

        reply.to_result()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
