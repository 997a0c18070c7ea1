use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use std::ops::RangeInclusive;

/// Naive ISO-8601 layouts accepted besides RFC 3339
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Years whose stored text form (`YYYY-MM-DD ...`) sorts chronologically
const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

/// Current time as a naive UTC timestamp, the form stored in the database
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parses an ISO-8601 timestamp into naive UTC
///
/// Accepts RFC 3339 with an offset (converted to UTC), naive date-times with a
/// `T` or space separator and optional fractional seconds, and bare dates
/// (midnight). Years outside 0000-9999 are rejected.
///
/// # Returns
/// * `Some(NaiveDateTime)` if the input matched one of the accepted forms
/// * `None` otherwise
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    parse_any(value.trim()).filter(|parsed| STORABLE_YEARS.contains(&parsed.year()))
}

fn parse_any(value: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Upper bound for the deadline window: `from` plus `days` days
///
/// Returns `None` when the result lies past year 9999, where every storable
/// deadline is already within the window.
pub fn window_end(from: NaiveDateTime, days: u64) -> Option<NaiveDateTime> {
    let window = TimeDelta::try_days(i64::try_from(days).ok()?)?;
    from.checked_add_signed(window)
        .filter(|end| end.year() <= *STORABLE_YEARS.end())
}
