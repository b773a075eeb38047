pub mod auth;
pub mod calendars;
pub mod export;
pub mod forget;
pub mod months;
pub mod show;

use anyhow::Result;
use calview_core::prefs::PreferenceStore;
use calview_core::viewer::{ImportOutcome, Viewer};
use chrono::{Local, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::source::{self, Source};

/// Preference scope holding the cached source URL
pub const SOURCE_SCOPE: &str = "source";
pub const URL_KEY: &str = "url";

/// Turn the optional source argument into a Source, falling back to the
/// last URL that was fetched successfully.
pub fn resolve_source(arg: Option<&str>, prefs: &mut PreferenceStore) -> Result<Source> {
    if let Some(arg) = arg {
        return Ok(Source::parse(arg));
    }

    match prefs.scope(SOURCE_SCOPE).get(URL_KEY, Utc::now()) {
        Some(url) => {
            info!(url = %url, "using cached calendar URL");
            Ok(Source::Url(url.to_string()))
        }
        None => anyhow::bail!(
            "No calendar source given.\n\
            Pass a file, URL, `-` for stdin, or `google`, e.g.\n\n\
            calview show https://example.com/calendar.ics"
        ),
    }
}

/// Import events from the source into a fresh viewer.
///
/// A successfully fetched URL is remembered for later runs.
pub async fn load_viewer(arg: Option<&str>, cfg: &Config) -> Result<Viewer> {
    let mut prefs = PreferenceStore::open_or_empty(PreferenceStore::default_path()?);
    let source = resolve_source(arg, &mut prefs)?;

    let mut viewer = Viewer::new(Local::now().date_naive());
    let ticket = viewer.begin_import();
    let result = source::load(&source, cfg).await;

    match viewer.finish_import(ticket, result) {
        ImportOutcome::Applied(count) => info!(source = %source, events = count, "imported events"),
        ImportOutcome::Failed(message) => anyhow::bail!(message),
        ImportOutcome::Stale => anyhow::bail!("Import of {} was superseded", source),
    }

    if let Some(url) = source.url() {
        if let Err(e) = cache_url(&mut prefs, url, cfg) {
            warn!(error = ?e, "could not cache calendar URL");
        }
    }

    Ok(viewer)
}

fn cache_url(prefs: &mut PreferenceStore, url: &str, cfg: &Config) -> Result<()> {
    let now = Utc::now();
    prefs
        .scope(SOURCE_SCOPE)
        .set(URL_KEY, url, Some(cfg.url_ttl()?), now)?;
    prefs.purge_expired(now);
    prefs.save()?;
    Ok(())
}
