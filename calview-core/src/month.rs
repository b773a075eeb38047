//! Grouping events by calendar month, with paging between months.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalViewError;
use crate::event::Event;
use crate::ics::date::parse_display_date;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Human label, e.g. "March 2024".
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(day) => day.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalViewError;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(YearMonth::of)
            .map_err(|_| CalViewError::InvalidMonth(s.to_string()))
    }
}

/// Events that start in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub month: YearMonth,
    pub events: Vec<Event>,
}

impl MonthBucket {
    /// Sum of event durations in hours. Negative durations count as-is.
    pub fn total_hours(&self) -> f64 {
        self.events.iter().map(Event::duration_hours).sum()
    }

    /// Events starting on `date`, in bucket order.
    pub fn events_on(&self, date: NaiveDate) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(move |e| parse_display_date(&e.start) == Some(date))
    }
}

/// Events bucketed by month, plus a cursor for paging.
#[derive(Debug, Clone, Default)]
pub struct MonthGroups {
    buckets: Vec<MonthBucket>,
    index: usize,
}

impl MonthGroups {
    /// Group `events` by start month. The cursor starts at `today`'s month
    /// when it has events, otherwise at the earliest month.
    pub fn new(events: &[Event], today: NaiveDate) -> Self {
        let mut by_month: BTreeMap<YearMonth, Vec<Event>> = BTreeMap::new();
        let mut undated = 0usize;

        for event in events {
            match parse_display_date(&event.start) {
                Some(date) => by_month.entry(YearMonth::of(date)).or_default().push(event.clone()),
                None => undated += 1,
            }
        }

        if undated > 0 {
            debug!(undated, "events without a start date left out of month groups");
        }

        let buckets: Vec<MonthBucket> = by_month
            .into_iter()
            .map(|(month, events)| MonthBucket { month, events })
            .collect();

        let current = YearMonth::of(today);
        let index = buckets.iter().position(|b| b.month == current).unwrap_or(0);

        MonthGroups { buckets, index }
    }

    pub fn buckets(&self) -> &[MonthBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Bucket under the cursor, `None` when there are no events.
    pub fn current(&self) -> Option<&MonthBucket> {
        self.buckets.get(self.index)
    }

    /// Move to the following month. Returns false at the last bucket.
    pub fn next_month(&mut self) -> bool {
        if self.index + 1 < self.buckets.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the preceding month. Returns false at the first bucket.
    pub fn prev_month(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `month` if it has events.
    pub fn select(&mut self, month: YearMonth) -> bool {
        match self.buckets.iter().position(|b| b.month == month) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }
}
