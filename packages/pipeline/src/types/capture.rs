//! Capture records, one per line in the capture log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::lenient;

/// A user-submitted URL awaiting processing.
///
/// Captures are immutable once written. Duplicates are tolerated in the
/// log and only collapsed at dedup time, by `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub url: String,

    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub note: String,

    /// Always written by the intake; older lines may lack it or carry a
    /// timestamp without an offset.
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub captured_at: Option<DateTime<Utc>>,
}

impl CaptureRecord {
    /// Create a capture stamped with the current time.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            note: String::new(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the user note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Set the capture timestamp.
    pub fn with_captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default() {
        let record: CaptureRecord =
            serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();

        assert_eq!(record.url, "https://example.com");
        assert_eq!(record.title, "");
        assert_eq!(record.note, "");
        assert_eq!(record.captured_at, None);
    }

    #[test]
    fn test_reads_python_style_offset_timestamps() {
        let record: CaptureRecord = serde_json::from_str(
            r#"{"url": "https://a.b", "title": "T", "note": "n",
                "captured_at": "2025-01-05T10:00:00.123456+00:00"}"#,
        )
        .unwrap();

        assert!(record.captured_at.is_some());
        assert_eq!(record.title, "T");
    }

    #[test]
    fn test_null_fields_and_naive_timestamp_are_tolerated() {
        let record: CaptureRecord = serde_json::from_str(
            r#"{"url": "https://a.test", "title": null, "note": null,
                "captured_at": "2025-01-05T10:00:00"}"#,
        )
        .unwrap();

        assert_eq!(record.title, "");
        assert_eq!(record.note, "");
        assert_eq!(
            record.captured_at.map(|t| t.to_rfc3339()),
            Some("2025-01-05T10:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_bad_timestamp_keeps_the_url() {
        let record: CaptureRecord = serde_json::from_str(
            r#"{"url": "https://a.test", "captured_at": "last tuesday"}"#,
        )
        .unwrap();

        assert_eq!(record.url, "https://a.test");
        assert_eq!(record.captured_at, None);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let result = serde_json::from_str::<CaptureRecord>(r#"{"title": "no url"}"#);
        assert!(result.is_err());
    }
}
