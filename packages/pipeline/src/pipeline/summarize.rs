//! Summary stage: truncate, prompt, parse.

use tracing::debug;

use crate::error::SummarizeResult;
use crate::pipeline::prompts::format_summary_prompt;
use crate::traits::model::LanguageModel;
use crate::types::summary::SummaryResult;

/// Content beyond this many characters is cut before prompting.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 100_000;

/// Marker appended to truncated content.
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Wraps a [`LanguageModel`] with the summary prompt and response format.
pub struct SummaryGenerator<M> {
    model: M,
    max_content_chars: usize,
}

impl<M: LanguageModel> SummaryGenerator<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Summarize fetched content. One model call, no retry.
    pub async fn summarize(
        &self,
        url: &str,
        content: &str,
        note: &str,
        tag_vocabulary: &str,
    ) -> SummarizeResult<SummaryResult> {
        let content = truncate(content, self.max_content_chars);
        let prompt = format_summary_prompt(url, &content, note, tag_vocabulary);

        debug!(url = %url, model = self.model.name(), prompt_chars = prompt.len(), "Requesting summary");
        let response = self.model.complete(&prompt).await?;

        Ok(parse_response(&response))
    }
}

/// Cut `content` to `max` characters and mark it, or return it unchanged.
pub fn truncate(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

/// Split a model response into tags and summary.
///
/// Expected shape:
///
/// ```text
/// TAGS: a, b, c
/// ---
/// summary body
/// ```
///
/// Anything else is taken as a summary with no tags.
pub fn parse_response(response: &str) -> SummaryResult {
    let unparsed = || SummaryResult {
        summary: response.trim().to_string(),
        tags: Vec::new(),
    };

    let Some(declaration) = response.strip_prefix("TAGS:") else {
        return unparsed();
    };
    let (tag_line, rest) = declaration.split_once('\n').unwrap_or((declaration, ""));
    let Some((_, summary)) = rest.split_once("---") else {
        return unparsed();
    };

    let tags = tag_line
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    SummaryResult {
        summary: summary.trim().to_string(),
        tags,
    }
}
