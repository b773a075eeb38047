//! Where events come from: a file, stdin, a URL, or Google Calendar.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use calview_core::{CalViewError, CalViewResult, Event};
use tracing::{info, warn};

use crate::config::Config;
use crate::providers::google;

const FETCH_TIMEOUT_SECS: u64 = 30;

/// A parsed source argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
    Url(String),
    Google { calendar_id: String },
}

impl Source {
    /// Interpret a command-line source.
    ///
    /// `-` is stdin, `http(s)://` and `webcal(s)://` are URLs, `google` or
    /// `google:<calendar-id>` is Google Calendar, anything else is a path.
    pub fn parse(arg: &str) -> Source {
        let trimmed = arg.trim();
        let lower = trimmed.to_ascii_lowercase();

        if trimmed == "-" {
            Source::Stdin
        } else if ["http://", "https://", "webcal://", "webcals://"]
            .iter()
            .any(|scheme| lower.starts_with(scheme))
        {
            Source::Url(normalize_url(trimmed))
        } else if lower == "google" || lower.starts_with("google:") {
            let calendar_id = match trimmed.get(7..) {
                Some(id) if !id.is_empty() => id,
                _ => google::DEFAULT_CALENDAR_ID,
            };
            Source::Google {
                calendar_id: calendar_id.to_string(),
            }
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Source::Url(url) => Some(url),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Stdin => write!(f, "stdin"),
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
            Source::Google { calendar_id } => write!(f, "google:{}", calendar_id),
        }
    }
}

/// Rewrite `webcal://` and `webcals://` to `https://`.
pub fn normalize_url(url: &str) -> String {
    let lower = url.to_ascii_lowercase();

    for scheme in ["webcals://", "webcal://"] {
        if lower.starts_with(scheme) {
            let normalized = format!("https://{}", &url[scheme.len()..]);
            info!(raw = %url, normalized = %normalized, "rewrote webcal URL");
            return normalized;
        }
    }

    url.to_string()
}

/// Load and parse events from `source`.
pub async fn load(source: &Source, config: &Config) -> CalViewResult<Vec<Event>> {
    match source {
        Source::Stdin => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(calview_core::ics::parse_events(&content))
        }
        Source::File(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(calview_core::ics::parse_events(&content))
        }
        Source::Url(url) => {
            let content = fetch_ics(url).await?;
            Ok(calview_core::ics::parse_events(&content))
        }
        Source::Google { calendar_id } => {
            let credentials = config.google().map_err(|e| CalViewError::Config(format!("{:#}", e)))?;
            google::fetch_events(credentials, calendar_id)
                .await
                .map_err(|e| match e.downcast::<CalViewError>() {
                    Ok(err) => err,
                    Err(e) => CalViewError::Transport(format!("{:#}", e)),
                })
        }
    }
}

/// GET `url` and return the body. Non-success statuses are errors; no retry.
pub async fn fetch_ics(url: &str) -> CalViewResult<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| CalViewError::Transport(format!("failed building HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/calendar, text/plain;q=0.9, */*;q=0.8")
        .send()
        .await
        .map_err(|e| {
            warn!(url = %url, error = %e, "calendar request failed");
            CalViewError::Transport(format!("request to {} failed: {}", url, e))
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = %status, "calendar URL returned non-success status");
        return Err(CalViewError::Transport(format!("HTTP {} for {}", status, url)));
    }

    response
        .text()
        .await
        .map_err(|e| CalViewError::Transport(format!("failed reading response from {}: {}", url, e)))
}
