//! VEVENT extraction from raw ICS text.
//!
//! This is a line scanner, not a full RFC 5545 parser: it only looks for
//! `BEGIN:VEVENT`/`END:VEVENT` pairs and a handful of properties inside
//! them. Folded continuation lines are not joined.

use tracing::debug;

use super::date::normalize_date;
use crate::event::Event;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";

/// Properties copied into an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Summary,
    Start,
    End,
    Description,
    Location,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SUMMARY" => Some(Field::Summary),
            "DTSTART" => Some(Field::Start),
            "DTEND" => Some(Field::End),
            "DESCRIPTION" => Some(Field::Description),
            "LOCATION" => Some(Field::Location),
            _ => None,
        }
    }
}

/// Raw values collected from one open VEVENT block.
#[derive(Debug, Default)]
struct BlockBuilder {
    summary: Option<String>,
    start: Option<String>,
    end: Option<String>,
    description: Option<String>,
    location: Option<String>,
    /// Depth of nested components (VALARM etc.) currently open
    nested: usize,
}

impl BlockBuilder {
    /// Record a value unless the field was already seen in this block.
    fn record(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Summary => &mut self.summary,
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
            Field::Description => &mut self.description,
            Field::Location => &mut self.location,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    fn build(self) -> Event {
        Event {
            summary: self.summary.unwrap_or_default(),
            start: self.start.map(|t| normalize_date(&t)).unwrap_or_default(),
            end: self.end.map(|t| normalize_date(&t)).unwrap_or_default(),
            description: self.description,
            location: self.location,
        }
    }
}

/// Parse every VEVENT block in `content`, in source order.
///
/// Never fails: text without VEVENT blocks gives an empty list, blocks
/// without a closing `END:VEVENT` are dropped, and missing properties are
/// left empty.
pub fn parse_events(content: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut open: Option<BlockBuilder> = None;
    let mut unterminated = 0usize;

    for line in content.lines() {
        let marker = line.trim();

        if marker.eq_ignore_ascii_case(BEGIN_EVENT) {
            if open.replace(BlockBuilder::default()).is_some() {
                unterminated += 1;
            }
            continue;
        }

        let Some(block) = open.as_mut() else {
            continue;
        };

        if marker.eq_ignore_ascii_case(END_EVENT) {
            if let Some(block) = open.take() {
                events.push(block.build());
            }
            continue;
        }

        // Continuation of a folded line
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        if has_prefix(marker, "BEGIN:") {
            block.nested += 1;
            continue;
        }
        if has_prefix(marker, "END:") {
            block.nested = block.nested.saturating_sub(1);
            continue;
        }
        if block.nested > 0 {
            continue;
        }

        if let Some((name, value)) = split_property(line) {
            if let Some(field) = Field::from_name(name) {
                block.record(field, value);
            }
        }
    }

    if open.is_some() {
        unterminated += 1;
    }

    debug!(events = events.len(), unterminated, "parsed ICS text");
    events
}

fn has_prefix(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Split `NAME;PARAM=X:value` into `("NAME", "value")`.
fn split_property(line: &str) -> Option<(&str, &str)> {
    let (head, value) = line.split_once(':')?;
    let name = head.split(';').next().unwrap_or(head);
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM_SYNC: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:sync-1\r\n\
SUMMARY:Team Sync\r\n\
DTSTART:20240315T143000Z\r\n\
DTEND:20240315T153000Z\r\n\
DESCRIPTION:Weekly\r\n\
LOCATION:Room 4\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_single_event() {
        let events = parse_events(TEAM_SYNC);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.summary, "Team Sync");
        assert_eq!(event.start, "2024-03-15 14:30");
        assert_eq!(event.end, "2024-03-15 15:30");
        assert_eq!(event.description.as_deref(), Some("Weekly"));
        assert_eq!(event.location.as_deref(), Some("Room 4"));
    }

    #[test]
    fn test_events_keep_source_order() {
        let ics = r#"BEGIN:VCALENDAR
BEGIN:VEVENT
SUMMARY:Third of March
DTSTART;VALUE=DATE:20240303
END:VEVENT
BEGIN:VEVENT
SUMMARY:First of January
DTSTART;VALUE=DATE:20240101
END:VEVENT
BEGIN:VEVENT
SUMMARY:Second of February
DTSTART;VALUE=DATE:20240202
END:VEVENT
END:VCALENDAR"#;

        let summaries: Vec<String> = parse_events(ics).into_iter().map(|e| e.summary).collect();
        assert_eq!(
            summaries,
            vec!["Third of March", "First of January", "Second of February"]
        );
    }

    #[test]
    fn test_missing_location_stays_unset() {
        let ics = r#"BEGIN:VEVENT
SUMMARY:Lunch
DTSTART:20240315T120000Z
DTEND:20240315T130000Z
DESCRIPTION:Tacos
END:VEVENT"#;

        let events = parse_events(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].location, None);
        assert_eq!(events[0].summary, "Lunch");
        assert_eq!(events[0].description.as_deref(), Some("Tacos"));
        assert_eq!(events[0].start, "2024-03-15 12:00");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let events = parse_events("BEGIN:VEVENT\nUID:bare\nEND:VEVENT\n");

        assert_eq!(events, vec![Event::default()]);
    }

    #[test]
    fn test_no_events_is_empty_not_error() {
        assert!(parse_events("BEGIN:VCALENDAR\nVERSION:2.0\nEND:VCALENDAR\n").is_empty());
        assert!(parse_events("").is_empty());
        assert!(parse_events("not a calendar at all").is_empty());
    }

    #[test]
    fn test_unterminated_block_is_skipped() {
        let ics = r#"BEGIN:VEVENT
SUMMARY:Complete
END:VEVENT
BEGIN:VEVENT
SUMMARY:Never closed"#;

        let events = parse_events(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Complete");
    }

    #[test]
    fn test_unterminated_block_does_not_leak_into_next() {
        let ics = r#"BEGIN:VEVENT
SUMMARY:Broken
LOCATION:Nowhere
BEGIN:VEVENT
SUMMARY:Intact
END:VEVENT"#;

        let events = parse_events(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Intact");
        assert_eq!(events[0].location, None);
    }

    #[test]
    fn test_folded_lines_are_truncated() {
        let ics = "BEGIN:VEVENT\r\n\
SUMMARY:Quarterly planning\r\n\
DESCRIPTION:Agenda is \r\n long and folded\r\n\
END:VEVENT\r\n";

        let events = parse_events(ics);
        assert_eq!(events[0].description.as_deref(), Some("Agenda is "));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let ics = "BEGIN:VEVENT\nSUMMARY:First\nSUMMARY:Second\nEND:VEVENT\n";

        assert_eq!(parse_events(ics)[0].summary, "First");
    }

    #[test]
    fn test_alarm_properties_are_ignored() {
        let ics = r#"BEGIN:VEVENT
SUMMARY:Dentist
DTSTART:20240402T090000Z
BEGIN:VALARM
ACTION:DISPLAY
DESCRIPTION:Reminder
END:VALARM
END:VEVENT"#;

        let events = parse_events(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, None);
    }

    #[test]
    fn test_parameters_are_ignored() {
        let ics = r#"BEGIN:VEVENT
SUMMARY;LANGUAGE=en:Review
DTSTART;TZID=Europe/Berlin:20240402T090000
DTEND;VALUE=DATE:20240403
END:VEVENT"#;

        let events = parse_events(ics);
        assert_eq!(events[0].summary, "Review");
        assert_eq!(events[0].start, "2024-04-02 09:00");
        assert_eq!(events[0].end, "2024-04-03");
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let ics = "BEGIN:VEVENT\nLOCATION:https://meet.example.com/abc\nEND:VEVENT\n";

        assert_eq!(
            parse_events(ics)[0].location.as_deref(),
            Some("https://meet.example.com/abc")
        );
    }

    #[test]
    fn test_parse_generated_calendar() {
        use chrono::{NaiveDate, TimeZone, Utc};
        use icalendar::{Calendar, Component, EventLike};

        let mut calendar = Calendar::new();
        for (day, name) in [(1, "Kickoff"), (9, "Design review"), (20, "Retro")] {
            let date = NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date");
            calendar.push(icalendar::Event::new().summary(name).all_day(date).done());
        }
        let timed = Utc
            .with_ymd_and_hms(2024, 5, 21, 8, 15, 0)
            .single()
            .expect("valid datetime");
        calendar.push(icalendar::Event::new().summary("Deploy").starts(timed).done());
        let text = calendar.done().to_string();

        let events = parse_events(&text);
        let summaries: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Kickoff", "Design review", "Retro", "Deploy"]);
        assert_eq!(events[1].start, "2024-05-09");
        assert_eq!(events[3].start, "2024-05-21 08:15");
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let ics = r#"begin:vevent
summary:Lowercase
Dtstart;Value=Date:20240610
location:Annex
begin:valarm
description:Reminder
end:valarm
End:VEvent"#;

        let events = parse_events(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Lowercase");
        assert_eq!(events[0].start, "2024-06-10");
        assert_eq!(events[0].location.as_deref(), Some("Annex"));
        assert_eq!(events[0].description, None);
    }
}
