//! Conversion between ICS date tokens and display strings.
//!
//! Display strings come in two shapes: `YYYY-MM-DD` for all-day values and
//! `YYYY-MM-DD HH:MM` for timed values. Timezone suffixes are dropped, so a
//! timed value is a wall-clock reading, not an instant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DISPLAY_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATETIME: &str = "%Y-%m-%d %H:%M";

/// Normalize an ICS date token into a display string.
///
/// - `20240315` becomes `2024-03-15`
/// - `20240315T143000Z` becomes `2024-03-15 14:30`
///
/// Anything that isn't exactly eight characters is read as a date-time,
/// taking hour and minute from fixed offsets after the `T`. Short or odd
/// tokens come out truncated instead of failing.
pub fn normalize_date(token: &str) -> String {
    let chars: Vec<char> = token.trim().chars().collect();

    let year = piece(&chars, 0, 4);
    let month = piece(&chars, 4, 6);
    let day = piece(&chars, 6, 8);

    if chars.len() == 8 {
        return format!("{}-{}-{}", year, month, day);
    }

    let hour = piece(&chars, 9, 11);
    let minute = piece(&chars, 11, 13);
    format!("{}-{}-{} {}:{}", year, month, day, hour, minute)
}

/// Characters `from..to`, clamped to the token length.
fn piece(chars: &[char], from: usize, to: usize) -> String {
    let to = to.min(chars.len());
    let from = from.min(to);
    chars[from..to].iter().collect()
}

/// Format an all-day date in display form.
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// Format a wall-clock date-time in display form.
pub fn display_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DISPLAY_DATETIME).to_string()
}

/// Read a display string back. Date-only values are taken at midnight.
pub fn parse_display(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, DISPLAY_DATETIME) {
        return Some(datetime);
    }
    NaiveDate::parse_from_str(value, DISPLAY_DATE)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// The calendar date of a display string, ignoring any time of day.
pub fn parse_display_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, DISPLAY_DATE).ok()
}
