//! CSV export of events.
//!
//! Every data field is wrapped in double quotes with inner quotes doubled.
//! Embedded newlines are written through unchanged.

use crate::date_range::ExportRange;
use crate::event::Event;

const HEADER: [&str; 5] = ["Summary", "Start Date", "End Date", "Location", "Description"];

/// Serialize the events whose start falls within `range`.
///
/// The result is a header row followed by one row per matching event, rows
/// joined with `\n` and no trailing newline.
pub fn export_csv(events: &[Event], range: &ExportRange) -> String {
    let mut rows = vec![HEADER.join(",")];

    rows.extend(events.iter().filter(|e| range.includes(e)).map(to_row));

    rows.join("\n")
}

fn to_row(event: &Event) -> String {
    [
        event.summary.as_str(),
        event.start.as_str(),
        event.end.as_str(),
        event.location.as_deref().unwrap_or(""),
        event.description.as_deref().unwrap_or(""),
    ]
    .iter()
    .map(|field| quote(field))
    .collect::<Vec<_>>()
    .join(",")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
