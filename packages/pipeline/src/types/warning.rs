//! Warnings for malformed lines skipped while loading JSONL files.

use std::fmt;

/// Which file a skipped line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSource {
    CaptureLog,
    Ledger,
}

impl fmt::Display for WarningSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaptureLog => f.write_str("capture log"),
            Self::Ledger => f.write_str("ledger"),
        }
    }
}

/// A line that could not be parsed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub source: WarningSource,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}: {}", self.source, self.line, self.message)
    }
}
