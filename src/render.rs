//! Terminal rendering for months and events.
//!
//! Extension traits over calview-core types using owo_colors.

use calview_core::event::Event;
use calview_core::ics::date::parse_display;
use calview_core::month::{MonthBucket, MonthGroups};
use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let time = format_time(self);
        let mut line = format!("{} {}", time.dimmed(), self);

        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            line.push_str(&format!(" {}", format!("@ {}", location).dimmed()));
        }
        line
    }
}

/// Month grid followed by the events of each day.
impl Render for MonthBucket {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let header = format!(
            "{} {}",
            self.month.label().bold(),
            format!(
                "({} {}, {})",
                self.events.len(),
                pluralize("event", self.events.len()),
                format_hours(self.total_hours())
            )
            .dimmed()
        );
        lines.push(header);

        let Some(first) = self.month.first_day() else {
            return lines.join("\n");
        };
        let days: Vec<NaiveDate> = first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .collect();

        lines.push(String::new());
        lines.push("Mo Tu We Th Fr Sa Su".dimmed().to_string());

        let offset = first.weekday().num_days_from_monday() as usize;
        let mut cells: Vec<String> = vec!["  ".to_string(); offset];
        for day in &days {
            let number = format!("{:>2}", day.day());
            if self.events_on(*day).next().is_some() {
                cells.push(number.cyan().bold().to_string());
            } else {
                cells.push(number);
            }
        }
        for week in cells.chunks(7) {
            lines.push(week.join(" "));
        }

        for day in &days {
            let mut on_day = self.events_on(*day).peekable();
            if on_day.peek().is_none() {
                continue;
            }
            lines.push(String::new());
            lines.push(day.format("%a %b %-d").to_string().bold().to_string());
            for event in on_day {
                lines.push(format!("  {}", event.render()));
            }
        }

        lines.join("\n")
    }
}

/// One line per month, the current one marked.
impl Render for MonthGroups {
    fn render(&self) -> String {
        if self.is_empty() {
            return "No events found".dimmed().to_string();
        }

        self.buckets()
            .iter()
            .enumerate()
            .map(|(i, bucket)| {
                let marker = if i == self.index() { ">" } else { " " };
                let counts = format!(
                    "{:>4} {}  {:>8}",
                    bucket.events.len(),
                    pluralize("event", bucket.events.len()),
                    format_hours(bucket.total_hours())
                );
                format!("{} {}  {:<15} {}", marker, bucket.month, bucket.month.label(), counts.dimmed())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// "14:30" for timed events, "all-day" otherwise
fn format_time(event: &Event) -> String {
    if event.is_all_day() {
        return "all-day".to_string();
    }
    match parse_display(&event.start) {
        Some(dt) => format!("{:>7}", dt.format("%H:%M").to_string()),
        None => format!("{:>7}", "?"),
    }
}

fn format_hours(hours: f64) -> String {
    format!("{:.1}h", hours)
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
