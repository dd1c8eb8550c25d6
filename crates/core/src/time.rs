//! Permissive event-time parsing.
//!
//! Values carrying an offset are converted to UTC. Naive values are taken as
//! UTC so every timestamp in a run is comparable.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::CoreError;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d:%H:%M:%S%.f%z",
    "%Y-%m-%d:%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d:%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %H:%M:%S",
    "%a %b %e %H:%M:%S %Y",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%a, %d %B %Y",
];

/// Parse a human-readable timestamp.
///
/// Accepts RFC 3339, RFC 2822, the `YYYY-MM-DD:HH:MM:SS.fffZ` shape used by
/// the event feed, common ISO-like and US layouts, and written-out month
/// names. A bare date means midnight.
pub fn parse_event_time(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(date_error(raw));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let (body, utc_suffix) = strip_utc_suffix(value);
    if !utc_suffix {
        for format in OFFSET_FORMATS {
            if let Ok(parsed) = DateTime::parse_from_str(body, format) {
                return Ok(parsed.with_timezone(&Utc));
            }
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(body, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(body, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }

    Err(date_error(raw))
}

fn strip_utc_suffix(value: &str) -> (&str, bool) {
    for suffix in [" UTC", " GMT"] {
        if let Some(body) = value.strip_suffix(suffix) {
            return (body.trim_end(), true);
        }
    }
    let bytes = value.as_bytes();
    if bytes.len() > 1
        && matches!(bytes[bytes.len() - 1], b'Z' | b'z')
        && bytes[bytes.len() - 2].is_ascii_digit()
    {
        return (&value[..value.len() - 1], true);
    }
    (value, false)
}

fn date_error(raw: &str) -> CoreError {
    CoreError::DateParse {
        value: raw.to_string(),
    }
}
