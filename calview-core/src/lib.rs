//! Core of calview: ICS parsing, month grouping, CSV export and the viewer
//! state that ties them together.
//!
//! Network access and rendering live in the `calview` binary; this crate
//! only deals with text in and events out.

pub mod csv;
pub mod date_range;
pub mod error;
pub mod event;
pub mod ics;
pub mod month;
pub mod prefs;
pub mod viewer;

pub use error::{CalViewError, CalViewResult};
pub use event::Event;
