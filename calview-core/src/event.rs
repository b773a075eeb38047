//! The event record shared by every import path.
//!
//! ICS imports and the Google provider both produce this shape. Dates are
//! kept in their display form (`YYYY-MM-DD` or `YYYY-MM-DD HH:MM`) rather
//! than as timestamps; see [`crate::ics::date`] for reading them back.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ics::date::parse_display;

/// A calendar event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Short label, empty when the source had none
    pub summary: String,
    /// Display-form start, empty when the source had none
    pub start: String,
    /// Display-form end, empty when the source had none
    pub end: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl Event {
    /// Start as a wall-clock instant, if it parses.
    pub fn start_instant(&self) -> Option<NaiveDateTime> {
        parse_display(&self.start)
    }

    /// End as a wall-clock instant, if it parses.
    pub fn end_instant(&self) -> Option<NaiveDateTime> {
        parse_display(&self.end)
    }

    /// Duration in hours (`end - start`). Zero when either side does not parse.
    ///
    /// An end before the start yields a negative value.
    pub fn duration_hours(&self) -> f64 {
        match (self.start_instant(), self.end_instant()) {
            (Some(start), Some(end)) => (end - start).num_minutes() as f64 / 60.0,
            _ => 0.0,
        }
    }

    /// Whether the event spans whole days (start has no time of day).
    pub fn is_all_day(&self) -> bool {
        self.start.len() == 10
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.summary.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.summary)
        }
    }
}
