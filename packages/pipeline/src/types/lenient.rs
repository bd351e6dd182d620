//! Field deserializers for log lines written by other tools.
//!
//! A line is only rejected when it has no usable `url`; every other field
//! degrades to a default instead of discarding the record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Offset-free layouts, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// `null` reads as the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339, else an offset-free ISO 8601 timestamp as UTC, else `None`.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => parse_timestamp(&raw),
        _ => None,
    })
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_free_timestamp_is_utc() {
        assert_eq!(
            parse_timestamp("2025-01-05T10:00:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2025-01-05 10:00:00.5").map(|t| t.timestamp()),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap().timestamp())
        );
    }

    #[test]
    fn test_offset_timestamp_is_converted() {
        assert_eq!(
            parse_timestamp("2025-01-05T12:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_garbage_timestamp_is_none() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
