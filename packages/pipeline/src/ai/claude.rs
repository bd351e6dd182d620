//! Anthropic implementation of the LanguageModel trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipeline::ai::Claude;
//!
//! let model = Claude::new("sk-ant-...").with_model("claude-sonnet-4-20250514");
//! let summarizer = SummaryGenerator::new(model);
//! ```

use std::time::Duration;

use anthropic_client::{AnthropicClient, AnthropicError, DEFAULT_MODEL};
use async_trait::async_trait;

use crate::error::{SummarizeError, SummarizeResult};
use crate::traits::model::LanguageModel;

/// Response length cap for one summary.
pub const DEFAULT_MAX_TOKENS: u32 = 1200;

/// Claude-backed summarization model.
#[derive(Clone)]
pub struct Claude {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
}

impl Claude {
    /// Create a new model with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_client(AnthropicClient::new(api_key))
    }

    /// Wrap an existing client.
    pub fn from_client(client: AnthropicClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the model (default: claude-sonnet-4-20250514).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the response token limit (default: 1200).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl From<AnthropicError> for SummarizeError {
    fn from(e: AnthropicError) -> Self {
        if e.is_transport() {
            SummarizeError::Transport(e.to_string())
        } else {
            SummarizeError::MalformedResponse(e.to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for Claude {
    async fn complete(&self, prompt: &str) -> SummarizeResult<String> {
        Ok(self
            .client
            .complete(&self.model, prompt, self.max_tokens)
            .await?)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
