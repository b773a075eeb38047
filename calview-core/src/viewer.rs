//! The viewer state: current events, month cursor, and import bookkeeping.
//!
//! Imports are sequenced with tickets. Only the most recently started import
//! may replace the event list; a slower, older one that finishes later is
//! discarded.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::CalViewResult;
use crate::event::Event;
use crate::ics::parse_events;
use crate::month::MonthGroups;

/// Handle for one import attempt, returned by [`Viewer::begin_import`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket(u64);

/// What happened to a finished import.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// Events replaced, with the new count
    Applied(usize),
    /// A newer import started in the meantime; result dropped
    Stale,
    /// The import failed; previous events kept
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Viewer {
    events: Vec<Event>,
    months: MonthGroups,
    today: NaiveDate,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl Viewer {
    /// An empty viewer. `today` picks the initial month after each import.
    pub fn new(today: NaiveDate) -> Self {
        Viewer {
            events: Vec::new(),
            months: MonthGroups::default(),
            today,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn begin_import(&mut self) -> ImportTicket {
        self.generation += 1;
        self.loading = true;
        ImportTicket(self.generation)
    }

    pub fn finish_import(
        &mut self,
        ticket: ImportTicket,
        result: CalViewResult<Vec<Event>>,
    ) -> ImportOutcome {
        if ticket.0 != self.generation {
            info!(ticket = ticket.0, latest = self.generation, "discarding stale import");
            return ImportOutcome::Stale;
        }

        self.loading = false;

        match result {
            Ok(events) => {
                self.months = MonthGroups::new(&events, self.today);
                self.events = events;
                self.error = None;
                ImportOutcome::Applied(self.events.len())
            }
            Err(err) => {
                warn!(error = %err, "import failed");
                let message = err.to_string();
                self.error = Some(message.clone());
                ImportOutcome::Failed(message)
            }
        }
    }

    /// Finish an import from raw ICS text.
    pub fn import_ics(&mut self, ticket: ImportTicket, content: &str) -> ImportOutcome {
        self.finish_import(ticket, Ok(parse_events(content)))
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.months = MonthGroups::default();
        self.error = None;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn months(&self) -> &MonthGroups {
        &self.months
    }

    pub fn months_mut(&mut self) -> &mut MonthGroups {
        &mut self.months
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the last failed import, if it was the latest.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
