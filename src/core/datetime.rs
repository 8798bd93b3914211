//! Date and time parsing for command-line input.
//!
//! Session times are entered as wall-clock values ("09:15",
//! "yesterday 17:30", "2024-03-04 08:00"). Parsing is relative to a caller
//! supplied `today` so it stays deterministic in tests.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // "9:30", "09:30", "17.45"
    Regex::new(r"^(\d{1,2})[:.](\d{2})$").unwrap_or_else(|e| panic!("Invalid time regex: {e}"))
});

static DAYS_AGO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})\s*(?:d|days?)\s+ago$")
        .unwrap_or_else(|e| panic!("Invalid days-ago regex: {e}"))
});

static ISO_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$")
        .unwrap_or_else(|e| panic!("Invalid date regex: {e}"))
});

/// Parse a time of day ("9:30", "09:30", "17.45").
#[must_use]
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "midnight" => return Some(NaiveTime::MIN),
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        _ => {}
    }

    let caps = TIME_PATTERN.captures(&input)?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse a time of day into minutes after midnight.
#[must_use]
pub fn parse_minutes_of_day(input: &str) -> Option<u32> {
    use chrono::Timelike;

    parse_time_of_day(input).map(|t| t.hour() * 60 + t.minute())
}

/// Format minutes after midnight as "HH:MM".
#[must_use]
pub fn format_minutes_of_day(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse a date relative to `today`.
///
/// Supports:
/// - `today`, `yesterday`
/// - `monday` .. `sunday` (most recent occurrence, today included)
/// - `3 days ago`, `3d ago`
/// - `2024-03-04` (ISO format)
#[must_use]
pub fn parse_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "today" | "now" => return Some(today),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(weekday) = parse_weekday(&input) {
        return Some(most_recent(today, weekday));
    }

    if let Some(caps) = DAYS_AGO_PATTERN.captures(&input) {
        let days: i64 = caps.get(1)?.as_str().parse().ok()?;
        return today.checked_sub_signed(Duration::days(days));
    }

    let caps = ISO_DATE_PATTERN.captures(&input)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a local date and time relative to `today`.
///
/// Accepts `<time>` (today), `<date> <time>` and `<date>T<time>`, where
/// `<date>` is anything [`parse_date`] understands.
#[must_use]
pub fn parse_date_time(input: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let input = input.trim();

    if let Some(time) = parse_time_of_day(input) {
        return Some(today.and_time(time));
    }

    let (date_part, time_part) = input
        .rsplit_once(' ')
        .or_else(|| input.split_once('T'))?;
    let date = parse_date(date_part, today)?;
    let time = parse_time_of_day(time_part)?;
    Some(date.and_time(time))
}

/// Parse a rounding precision in hours.
///
/// A decimal comma is accepted ("0,25"). The value must be finite and
/// greater than zero.
#[must_use]
pub fn parse_precision(input: &str) -> Option<f64> {
    let value: f64 = input.trim().replace(',', ".").parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn most_recent(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (7 + today.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    today - Duration::days(i64::from(back))
}
