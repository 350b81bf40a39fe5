//! Lenient parsing for the wall-clock timestamps the clinic backend emits.
//!
//! Records arrive as `2024-01-05T10:30:00`, `2024-01-05 10:30` or full RFC 3339.
//! Anything else is kept as `None` so aggregators can report the record instead
//! of failing the whole payload.
//!
//! The caller's reference instant (`now`) is the exception: it is parsed strictly
//! by [`resolve_now`] and rejected when unreadable.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::AppError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a local wall-clock timestamp. RFC 3339 offsets are dropped, keeping the
/// local time as written.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Like [`parse_local_datetime`], but a bare `YYYY-MM-DD` also parses, as midnight.
pub fn parse_reference_datetime(raw: &str) -> Option<NaiveDateTime> {
    parse_local_datetime(raw).or_else(|| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    })
}

/// Server wall clock, local time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// The reference instant for one request. An absent `now` falls back to the
/// server clock; a present but unreadable one is a bad request.
pub fn resolve_now(raw: Option<&str>) -> Result<NaiveDateTime, AppError> {
    match raw {
        None => Ok(local_now()),
        Some(value) => parse_reference_datetime(value).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid now {:?}: expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]",
                value
            ))
        }),
    }
}

/// `deserialize_with` helper: missing, null, non-string or unparsable values all
/// become `None`.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_local_datetime))
}

/// `deserialize_with` helper for calendar dates on records (birth dates). Accepts
/// `YYYY-MM-DD` or any record timestamp; everything else becomes `None`.
pub fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_reference_datetime)
        .map(|at| at.date()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_accepts_backend_formats() {
        assert_eq!(parse_local_datetime("2024-01-05T10:30:00"), Some(at(10, 30)));
        assert_eq!(parse_local_datetime("2024-01-05T10:30"), Some(at(10, 30)));
        assert_eq!(parse_local_datetime("2024-01-05 10:30"), Some(at(10, 30)));
        assert_eq!(parse_local_datetime("2024-01-05T10:30:00.000"), Some(at(10, 30)));
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        assert_eq!(parse_local_datetime("2024-01-05T10:30:00+05:30"), Some(at(10, 30)));
        assert_eq!(parse_local_datetime("2024-01-05T10:30:00Z"), Some(at(10, 30)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_local_datetime(""), None);
        assert_eq!(parse_local_datetime("next tuesday"), None);
        assert_eq!(parse_local_datetime("2024-13-40T10:00"), None);
    }

    #[test]
    fn test_reference_time_accepts_bare_dates() {
        assert_eq!(parse_reference_datetime("2024-01-05"), Some(at(0, 0)));
        assert_eq!(parse_reference_datetime("2024-01-05T10:30"), Some(at(10, 30)));
        assert_eq!(parse_reference_datetime("05/01/2024"), None);
    }

    #[test]
    fn test_resolve_now_rejects_unreadable_values() {
        assert_eq!(resolve_now(Some("2024-01-05")).unwrap(), at(0, 0));
        assert!(matches!(resolve_now(Some("yesterday")), Err(AppError::BadRequest(_))));
        assert!(resolve_now(None).is_ok());
    }
}
