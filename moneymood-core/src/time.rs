//! Time utilities: lenient timestamp parsing and calendar-day keys.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a transaction timestamp.
///
/// RFC 3339 values keep their wall-clock time as written (the offset is dropped), so a
/// record's calendar day is the date portion of its text. Date-only values map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
}

/// Whether the text carries a time of day rather than just a date.
pub fn has_clock_time(raw: &str) -> bool {
    raw.contains(':')
}

/// Current instant in the format used for records that arrive without a date.
pub fn timestamp_now(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar-day bucket of a transaction.
///
/// Ordering puts every real date (ascending) before any text that could not be read as a
/// date, so unreadable rows still show up in daily totals instead of vanishing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DayKey {
    Date(NaiveDate),
    Unparsed(String),
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DayKey::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// Truncate a timestamp to its calendar day.
pub fn day_key(raw: &str) -> DayKey {
    if let Some(ts) = parse_timestamp(raw) {
        return DayKey::Date(ts.date());
    }
    let prefix = raw
        .trim()
        .split_once(['T', ' '])
        .map(|(day, _)| day)
        .unwrap_or(raw.trim());
    match parse_date(prefix) {
        Some(d) => DayKey::Date(d),
        None => DayKey::Unparsed(prefix.to_string()),
    }
}
