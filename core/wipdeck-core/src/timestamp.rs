//! Parsing and formatting of the `Last Updated Date/Time` field.
//!
//! The hook writes local wall-clock times in one of two layouts:
//!
//! ```text
//! Saturday 14 February 2026 19:30:55
//! Saturday 14th February 19:30:55
//! ```
//!
//! Ordinal suffixes are stripped before parsing. The weekday must be a word
//! but is not checked against the date.
//!
//! # Year-less timestamps
//!
//! When the year is omitted we assume the current year. If that date does not
//! exist (29 February) or lies in the future, the previous year is used. If
//! neither year yields a valid past instant the timestamp is unknown.

use crate::patterns::RE_ORDINAL_SUFFIX;
use chrono::{Datelike, Month, NaiveDate, NaiveDateTime, NaiveTime};

/// Values shorter than this are treated as placeholders.
const MIN_TIMESTAMP_LEN: usize = 10;

/// Parses a timestamp relative to `now` (needed for year-less values).
///
/// Returns `None` for empty, placeholder (`[...]`) or unparseable input;
/// callers treat that as "unknown age", never as "now".
pub fn parse_timestamp(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('[') || raw.len() < MIN_TIMESTAMP_LEN {
        return None;
    }

    let cleaned = RE_ORDINAL_SUFFIX.replace_all(raw, "$1");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let (weekday, day, month, year, time) = match tokens.as_slice() {
        [weekday, day, month, year, time] => (*weekday, *day, *month, Some(*year), *time),
        [weekday, day, month, time] => (*weekday, *day, *month, None, *time),
        _ => return None,
    };

    if !weekday.chars().all(char::is_alphabetic) {
        return None;
    }
    let day: u32 = day.parse().ok()?;
    let month = month.parse::<Month>().ok()?.number_from_month();
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;

    match year {
        Some(year) => {
            if year.len() != 4 {
                return None;
            }
            let year: i32 = year.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(time))
        }
        None => [now.year(), now.year() - 1].into_iter().find_map(|year| {
            NaiveDate::from_ymd_opt(year, month, day)
                .map(|date| date.and_time(time))
                .filter(|candidate| *candidate <= now)
        }),
    }
}

/// Formats the age of a timestamp for display, e.g. `4m ago`.
pub fn format_age(last_updated: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    let Some(last_updated) = last_updated else {
        return "?".to_string();
    };
    let secs = now.signed_duration_since(last_updated).num_seconds();
    if secs < 0 {
        return "future?".to_string();
    }
    if secs < 60 {
        return format!("{}s ago", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    format!("{}h {}m ago", mins / 60, mins % 60)
}
