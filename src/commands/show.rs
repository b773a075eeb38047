use anyhow::Result;
use calview_core::month::YearMonth;
use calview_core::viewer::Viewer;
use owo_colors::OwoColorize;

use crate::render::Render;

/// Print the month grid for the selected month.
///
/// Without `month`, starts from the current month (or the earliest one with
/// events) and pages `forward`/`back` from there, stopping at either end.
pub fn run(mut viewer: Viewer, month: Option<YearMonth>, forward: usize, back: usize) -> Result<()> {
    let months = viewer.months_mut();

    if let Some(month) = month {
        if !months.select(month) {
            anyhow::bail!("No events in {}", month.label());
        }
    }

    for _ in 0..forward {
        if !months.next_month() {
            break;
        }
    }
    for _ in 0..back {
        if !months.prev_month() {
            break;
        }
    }

    match months.current() {
        Some(bucket) => {
            println!("{}", bucket.render());
            println!(
                "\n{}",
                format!("Month {} of {}", months.index() + 1, months.len()).dimmed()
            );
        }
        None => println!("{}", "No events found".dimmed()),
    }

    Ok(())
}
