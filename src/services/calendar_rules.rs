use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::errors::AppError;
use crate::models::operating_hours::WEEKDAY_KEYS;
use crate::models::DayHours;

/// Length of one bookable slot.
pub const SLOT_MINUTES: u32 = 45;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Slot starts in `[start, end)`, 45 minutes apart beginning at `start`,
/// minus the ones in `taken`. A window shorter than one slot has none.
pub fn calculate_available_slots(start: NaiveTime, end: NaiveTime, taken: &[String]) -> Vec<String> {
    let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
    let start_minutes = minutes_from_midnight(start);
    let end_minutes = minutes_from_midnight(end);

    if end_minutes < start_minutes + SLOT_MINUTES {
        return vec![];
    }

    let mut slots = vec![];
    let mut cursor = start_minutes;
    while cursor < end_minutes {
        let slot = format!("{:02}:{:02}", cursor / 60, cursor % 60);
        if !taken.contains(slot.as_str()) {
            slots.push(slot);
        }
        cursor += SLOT_MINUTES;
    }
    slots
}

fn minutes_from_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Lowercase English weekday name, the key used in operating hours.
pub fn day_of_week_key(date: NaiveDate) -> &'static str {
    WEEKDAY_KEYS[date.weekday().num_days_from_monday() as usize]
}

/// Whether `time` falls in `[hours.start, hours.end)`. A closed day admits nothing.
pub fn is_within_operating_window(time: NaiveTime, hours: &DayHours) -> bool {
    match hours.window() {
        Some((start, end)) => time >= start && time < end,
        None => false,
    }
}

pub fn validate_future_date(date: &NaiveDateTime, now: &NaiveDateTime) -> Result<(), AppError> {
    if date <= now {
        return Err(AppError::bad_request("The appointment time must be in the future."));
    }
    Ok(())
}

/// Parses a client-supplied appointment date. Offsets are normalized to UTC;
/// a date without an offset is taken as UTC already. Slot starts fall on
/// whole minutes, so seconds must be zero.
pub fn parse_appointment_date(s: &str) -> Result<NaiveDateTime, AppError> {
    let dt = parse_timestamp(s)?;
    if dt.second() != 0 || dt.nanosecond() != 0 {
        return Err(AppError::bad_request(
            "The appointment time must start on a whole minute.",
        ));
    }
    Ok(dt)
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, AppError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| AppError::bad_request(format!("Invalid date: {s}")))
}

/// Parses a calendar day, either "YYYY-MM-DD" or a full timestamp whose UTC
/// date is used.
pub fn parse_day(s: &str) -> Result<NaiveDate, AppError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_timestamp(s).map(|dt| dt.date())
}

/// `[start of day, start of next day)` for `date`.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

pub fn format_slot(dt: &NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}
