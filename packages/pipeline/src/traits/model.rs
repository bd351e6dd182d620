//! Language model trait for the summarization collaborator.
//!
//! The pipeline only needs one capability from a model: turn a prompt into
//! text. Prompt wording and response parsing live in the summary generator,
//! so backends stay thin.

use async_trait::async_trait;

use crate::error::SummarizeResult;

/// A text-completion backend.
///
/// Implementations wrap a provider (Anthropic, a local model, a mock) and
/// map provider failures onto [`SummarizeError`](crate::error::SummarizeError).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single user prompt.
    async fn complete(&self, prompt: &str) -> SummarizeResult<String>;

    /// Get the model name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
