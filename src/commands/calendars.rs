use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config;
use crate::providers::google;

pub async fn run() -> Result<()> {
    let cfg = config::load_config()?;
    let calendars = google::fetch_calendars(cfg.google()?).await?;

    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for calendar in calendars {
        let marker = if calendar.primary { "*" } else { " " };
        println!("{} {}  {}", marker, calendar.name, format!("google:{}", calendar.id).dimmed());
    }

    Ok(())
}
