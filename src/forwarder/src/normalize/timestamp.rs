//! Coerces heterogeneous log timestamps into integer epoch seconds, the only
//! form the Insights API accepts.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

static EPOCH_SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
// Tomcat and friends append milliseconds: "1609459200.123"
static FRACTIONAL_EPOCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)\.[0-9]+$").unwrap());

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%d/%b/%Y:%H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
];

// no offset in the string: read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S,%3f",
    "%Y/%m/%d %H:%M:%S",
    "%d/%b/%Y:%H:%M:%S",
    "%a %b %e %H:%M:%S %Y",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Digits only, but too large for epoch seconds
    OutOfRange(String),
    /// No supported date/time layout matched
    Unparsable(String),
    /// Neither a string nor a number
    UnsupportedType(&'static str),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::OutOfRange(raw) => write!(f, "timestamp `{}` is out of range", raw),
            TimestampError::Unparsable(raw) => write!(f, "could not parse timestamp `{}`", raw),
            TimestampError::UnsupportedType(kind) => {
                write!(f, "timestamp of type {} cannot be converted", kind)
            }
        }
    }
}

impl std::error::Error for TimestampError {}

/// Whole epoch seconds are kept, fractional epoch seconds are truncated, and
/// anything else goes through free-form date/time parsing.
pub fn coerce_timestamp(raw: &str) -> Result<i64, TimestampError> {
    let trimmed = raw.trim();

    if EPOCH_SECONDS.is_match(trimmed) {
        return trimmed
            .parse::<i64>()
            .map_err(|_| TimestampError::OutOfRange(raw.to_string()));
    }

    if let Some(captures) = FRACTIONAL_EPOCH.captures(trimmed) {
        return captures[1]
            .parse::<i64>()
            .map_err(|_| TimestampError::OutOfRange(raw.to_string()));
    }

    parse_datetime(trimmed).ok_or_else(|| TimestampError::Unparsable(raw.to_string()))
}

/// Same as [`coerce_timestamp`] for a JSON field value; numbers are accepted
/// directly, with fractions truncated.
pub fn coerce_timestamp_value(value: &Value) -> Result<i64, TimestampError> {
    match value {
        Value::String(raw) => coerce_timestamp(raw),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| TimestampError::OutOfRange(number.to_string())),
        Value::Null => Err(TimestampError::UnsupportedType("null")),
        Value::Bool(_) => Err(TimestampError::UnsupportedType("bool")),
        Value::Array(_) => Err(TimestampError::UnsupportedType("array")),
        Value::Object(_) => Err(TimestampError::UnsupportedType("object")),
    }
}

fn parse_datetime(raw: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.timestamp());
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        .map(|parsed| parsed.timestamp())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|parsed| parsed.and_utc().timestamp())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|parsed| parsed.and_utc().timestamp())
        })
}
