use anyhow::Result;

use crate::config;
use crate::providers::google;

pub async fn run(provider_name: &str) -> Result<()> {
    if provider_name != "google" {
        anyhow::bail!("Unknown provider '{}'. Supported providers: google", provider_name);
    }

    let cfg = config::load_config()?;
    let credentials = cfg.google()?;

    println!("Signing in to Google Calendar...");

    google::authenticate(credentials).await?;

    println!("\nSigned in. Tokens saved to {}", config::tokens_path()?.display());
    println!("\nRun `calview calendars` to list your calendars, then e.g.");
    println!("`calview show google:primary` to view one.");

    Ok(())
}
