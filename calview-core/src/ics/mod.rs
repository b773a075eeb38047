//! ICS text handling.
//!
//! Only VEVENT blocks are read; see [`parse::parse_events`].

pub mod date;
mod parse;

pub use date::normalize_date;
pub use parse::parse_events;
