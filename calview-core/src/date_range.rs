//! Inclusive date range used to pick events for export.

use chrono::NaiveDate;

use crate::error::{CalViewError, CalViewResult};
use crate::event::Event;
use crate::ics::date::parse_display_date;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ExportRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CalViewResult<Self> {
        if start > end {
            return Err(CalViewError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(ExportRange { start, end })
    }

    /// Parse two YYYY-MM-DD strings.
    pub fn parse(start: &str, end: &str) -> CalViewResult<Self> {
        ExportRange::new(parse_day(start)?, parse_day(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the event's start day falls in the range.
    pub fn includes(&self, event: &Event) -> bool {
        parse_display_date(&event.start).is_some_and(|date| self.contains(date))
    }

    /// Download name for a CSV export of this range.
    pub fn file_name(&self) -> String {
        format!("calendar-events-{}-to-{}.csv", self.start, self.end)
    }
}

fn parse_day(s: &str) -> CalViewResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CalViewError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starting(start: &str) -> Event {
        Event {
            start: start.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = ExportRange::parse("2024-03-01", "2024-03-31").expect("valid range");

        assert!(range.includes(&starting("2024-03-01")));
        assert!(range.includes(&starting("2024-03-31 23:30")));
        assert!(!range.includes(&starting("2024-04-01")));
        assert!(!range.includes(&starting("2024-02-29 23:59")));
    }

    #[test]
    fn test_unparseable_start_never_matches() {
        let range = ExportRange::parse("2024-03-01", "2024-03-31").expect("valid range");

        assert!(!range.includes(&starting("")));
        assert!(!range.includes(&starting("2024-- :")));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let err = ExportRange::parse("2024-03-31", "2024-03-01").unwrap_err();
        assert!(matches!(err, CalViewError::InvalidRange { .. }));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let err = ExportRange::parse("March 1", "2024-03-31").unwrap_err();
        assert!(matches!(err, CalViewError::InvalidDate(_)));
    }

    #[test]
    fn test_file_name() {
        let range = ExportRange::parse("2024-03-01", "2024-03-31").expect("valid range");
        assert_eq!(range.file_name(), "calendar-events-2024-03-01-to-2024-03-31.csv");
    }
}
