//! Ledger records: one per attempted capture.
//!
//! On disk the status is a single string: `"success"`, or one of the
//! prefixes `failed:`, `api_error:`, `write_error:` followed by a reason.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::types::lenient;

const FETCH_FAILED: &str = "failed:";
const SUMMARIZE_FAILED: &str = "api_error:";
const WRITE_FAILED: &str = "write_error:";

/// Outcome of one attempt.
///
/// Every variant, failures included, marks the URL as attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    FetchFailed(String),
    SummarizeFailed(String),
    WriteFailed(String),
    /// A status string written by something else; kept verbatim.
    Other(String),
}

impl Status {
    /// Status of a line that did not say what happened.
    pub fn unknown() -> Self {
        Self::Other(String::new())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Parse the on-disk string form. Never fails.
    pub fn parse(raw: &str) -> Self {
        if raw == "success" {
            return Self::Success;
        }
        let reason = |prefix: &str| raw[prefix.len()..].trim().to_string();
        if raw.starts_with(FETCH_FAILED) {
            Self::FetchFailed(reason(FETCH_FAILED))
        } else if raw.starts_with(SUMMARIZE_FAILED) {
            Self::SummarizeFailed(reason(SUMMARIZE_FAILED))
        } else if raw.starts_with(WRITE_FAILED) {
            Self::WriteFailed(reason(WRITE_FAILED))
        } else {
            Self::Other(raw.to_string())
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::FetchFailed(reason) => write!(f, "{FETCH_FAILED} {reason}"),
            Self::SummarizeFailed(reason) => write!(f, "{SUMMARIZE_FAILED} {reason}"),
            Self::WriteFailed(reason) => write!(f, "{WRITE_FAILED} {reason}"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Any value still marks the URL as attempted.
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Self::parse(&raw),
            Value::Null => Self::unknown(),
            other => Self::Other(other.to_string()),
        })
    }
}

/// One ledger line.
///
/// Only `url` is required to read a line back; a URL named anywhere in the
/// ledger is never attempted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub url: String,
    #[serde(default = "Status::unknown")]
    pub status: Status,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub at: Option<DateTime<Utc>>,
}

impl LedgerRecord {
    /// Create a record stamped with the current time.
    pub fn new(url: impl Into<String>, status: Status) -> Self {
        Self {
            url: url.into(),
            status,
            at: Some(Utc::now()),
        }
    }
}
