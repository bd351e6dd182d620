//! Structured summary returned by the summary generator.

/// Summary body plus the generated tags, in model order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary: String,
    pub tags: Vec<String>,
}
