//! Timestamp normalization for records coming from the backend.
//!
//! Appointment schedules are RFC 3339 in UTC, but invite expiries have been
//! seen as epoch milliseconds and US locale strings too. Everything that reads
//! a timestamp off the wire goes through [`parse_schedule`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EPOCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10,13}$").expect("regex compiles"));

static US_LOCALE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:,?\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp][Mm])?)?$",
    )
    .expect("regex compiles")
});

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a wire timestamp into a UTC instant. Values without an offset are
/// taken as UTC. Returns `None` instead of failing on anything unrecognized.
pub fn parse_schedule(raw: &str) -> Option<DateTime<Utc>> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    if EPOCH_RE.is_match(input) {
        return parse_epoch(input);
    }

    if let Some(dt) = parse_us_locale(input) {
        return Some(dt);
    }

    DateTime::parse_from_rfc2822(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn is_valid_schedule(raw: &str) -> bool {
    parse_schedule(raw).is_some()
}

fn parse_epoch(digits: &str) -> Option<DateTime<Utc>> {
    let value: i64 = digits.parse().ok()?;
    // Ten digits is a seconds timestamp, anything longer is milliseconds.
    if digits.len() == 10 {
        DateTime::from_timestamp(value, 0)
    } else {
        DateTime::from_timestamp_millis(value)
    }
}

fn parse_us_locale(input: &str) -> Option<DateTime<Utc>> {
    let caps = US_LOCALE_RE.captures(input)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let Some(hour) = caps.get(4) else {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    };
    let mut hour: u32 = hour.as_str().parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let second: u32 = match caps.get(6) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };

    if let Some(meridiem) = caps.get(7) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(date.and_time(time).and_utc())
}
