//! Day-first date parsing and whole-day arithmetic.
//!
//! Ticket exports carry dates as free text (`05/01/2024 14:30`, `2024-01-05`, ...). Parsing is
//! lenient and total: anything that is not a recognizable date yields `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::Value;

const SECONDS_PER_DAY: i64 = 86_400;

// Two-digit year formats come first: `%y` rejects four-digit years (trailing input), while
// `%Y` would happily read `24` as the year 24.
const DAY_FIRST_DATETIME: &[&str] = &[
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];
const DAY_FIRST_DATE: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const MONTH_FIRST_DATETIME: &[&str] = &["%m/%d/%Y %H:%M:%S%.f", "%m/%d/%Y %H:%M"];
const MONTH_FIRST_DATE: &[&str] = &["%m/%d/%Y"];

const YEAR_FIRST_DATETIME: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];
const YEAR_FIRST_DATE: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a date/time with day-first semantics.
///
/// Year-first (ISO) strings are read as such; `dd/mm/yyyy` style strings are read day-first and
/// only fall back to month-first when the day-first reading is not a valid date.
pub fn parse_day_first(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() >= 4 && s.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return parse_with(s, YEAR_FIRST_DATETIME, YEAR_FIRST_DATE).or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_local())
        });
    }

    parse_with(s, DAY_FIRST_DATETIME, DAY_FIRST_DATE)
        .or_else(|| parse_with(s, MONTH_FIRST_DATETIME, MONTH_FIRST_DATE))
}

fn parse_with(s: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<NaiveDateTime> {
    datetime_formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Re-read a cell as a date: date cells pass through, text is parsed, anything else is `None`.
pub fn value_as_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Utf8(s) => parse_day_first(s),
        Value::Null => None,
    }
}

/// Whole days from `start` to `end`, floored (a span of -1h is -1 day, 36h is 1 day).
pub fn whole_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}
