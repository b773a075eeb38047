//! Google Calendar: OAuth sign-in, calendar list and event import.
//!
//! Google events skip the ICS parser entirely; they are mapped straight
//! into the core `Event` shape using the same display strings.

use anyhow::{Context, Result};
use calview_core::ics::date::{display_date, display_datetime};
use calview_core::{CalViewError, Event};
use chrono::{DateTime, NaiveDate, Utc};
use google_calendar::types::{MinAccessRole, OrderBy};
use google_calendar::Client;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use tracing::{debug, info};

use crate::config::{self, AccountTokens, GoogleConfig};

/// Google's alias for the user's main calendar
pub const DEFAULT_CALENDAR_ID: &str = "primary";

const REDIRECT_PORT: u16 = 8085;
const REDIRECT_URI: &str = "http://localhost:8085/callback";

const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

/// Days of events fetched on each side of today
const FETCH_WINDOW_DAYS: i64 = 365;

/// Client carrying the stored tokens, or blank tokens for the consent step
fn client(config: &GoogleConfig, tokens: Option<&AccountTokens>) -> Client {
    let (access_token, refresh_token) = tokens
        .map(|t| (t.access_token.clone(), t.refresh_token.clone()))
        .unwrap_or_default();

    Client::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        REDIRECT_URI.to_string(),
        access_token,
        refresh_token,
    )
}

/// What Google sends back to the redirect URI
#[derive(Debug, PartialEq, Eq)]
struct OAuthCallback {
    code: String,
    state: String,
}

/// The `state` parameter embedded in a consent URL
fn consent_state(consent_url: &str) -> Option<String> {
    let url = url::Url::parse(consent_url).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
}

/// Read the callback out of `GET /callback?code=...&state=... HTTP/1.1`.
///
/// `Ok(None)` means the request was for some other path (favicon etc.).
/// A `state` that differs from `expected_state` is rejected.
fn parse_callback(request_line: &str, expected_state: Option<&str>) -> Result<Option<OAuthCallback>> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed HTTP request on the OAuth callback port")?;
    let url = url::Url::parse(&format!("http://localhost{}", target))?;

    if url.path() != "/callback" {
        return Ok(None);
    }

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(CalViewError::Unauthenticated(format!("Google denied access: {}", error)).into());
    }

    let code = param("code").context("No code in callback")?;
    let state = param("state").unwrap_or_default();

    if let Some(expected) = expected_state {
        if state != expected {
            return Err(CalViewError::Unauthenticated(
                "OAuth state mismatch; the callback did not come from this sign-in".to_string(),
            )
            .into());
        }
    }

    Ok(Some(OAuthCallback { code, state }))
}

/// Serve the loopback redirect until the callback request arrives
fn wait_for_callback(expected_state: Option<&str>) -> Result<OAuthCallback> {
    let listener = TcpListener::bind(("127.0.0.1", REDIRECT_PORT))
        .with_context(|| format!("Failed to bind to port {}", REDIRECT_PORT))?;

    println!("Waiting for Google to redirect back on port {}...", REDIRECT_PORT);

    loop {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut request_line = String::new();
        BufReader::new(&stream).read_line(&mut request_line)?;

        let outcome = parse_callback(&request_line, expected_state);
        let (status, body) = match &outcome {
            Ok(Some(_)) => ("200 OK", "Signed in to calview. You can close this window."),
            Ok(None) => ("404 Not Found", "Not found"),
            Err(_) => ("400 Bad Request", "Sign-in failed. Check the terminal for details."),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nConnection: close\r\n\r\n{}",
            status, body
        );
        stream.write_all(response.as_bytes())?;
        stream.flush()?;

        if let Some(callback) = outcome? {
            return Ok(callback);
        }
    }
}

/// Run the OAuth Authorization Code flow and store the tokens
pub async fn authenticate(config: &GoogleConfig) -> Result<AccountTokens> {
    let mut client = client(config, None);

    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
    let consent_url = client.user_consent_url(&scopes);
    let expected_state = consent_state(&consent_url);

    println!("\nOpen this URL in your browser to sign in:\n");
    println!("{}\n", consent_url);

    if open::that(&consent_url).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
    }

    let callback = wait_for_callback(expected_state.as_deref())?;

    info!("received authorization code, exchanging for tokens");

    let granted = client
        .get_access_token(&callback.code, &callback.state)
        .await
        .context("Failed to exchange code for tokens")?;

    let tokens = AccountTokens {
        access_token: granted.access_token,
        refresh_token: granted.refresh_token,
        expires_at: expires_at(granted.expires_in),
    };

    config::save_tokens(&tokens)?;

    Ok(tokens)
}

fn expires_at(expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in > 0 {
        Utc::now().checked_add_signed(chrono::Duration::try_seconds(expires_in)?)
    } else {
        None
    }
}

/// Stored tokens, refreshed if expired. Not signed in is an error, never a
/// prompt to sign in again.
async fn valid_tokens(config: &GoogleConfig) -> Result<AccountTokens> {
    let tokens = config::load_tokens()?.ok_or_else(|| {
        CalViewError::Unauthenticated("run `calview auth google` first".to_string())
    })?;

    if !tokens.is_expired() {
        return Ok(tokens);
    }

    debug!("access token expired, refreshing");
    let granted = client(config, Some(&tokens))
        .refresh_access_token()
        .await
        .context("Failed to refresh token")?;

    // Refresh responses usually omit the refresh token; keep the stored one
    let refreshed = AccountTokens {
        refresh_token: if granted.refresh_token.is_empty() {
            tokens.refresh_token
        } else {
            granted.refresh_token
        },
        access_token: granted.access_token,
        expires_at: expires_at(granted.expires_in),
    };

    config::save_tokens(&refreshed)?;
    Ok(refreshed)
}

/// A calendar from the user's calendar list
#[derive(Debug)]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub primary: bool,
}

/// Fetch the list of calendars for the signed-in user
pub async fn fetch_calendars(config: &GoogleConfig) -> Result<Vec<Calendar>> {
    let tokens = valid_tokens(config).await?;
    let client = client(config, Some(&tokens));

    let response = client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .context("Failed to fetch calendars")?;

    Ok(response
        .body
        .into_iter()
        .filter(|c| !c.id.is_empty())
        .map(|c| Calendar {
            id: c.id,
            name: if c.summary.is_empty() {
                "(unnamed)".to_string()
            } else {
                c.summary
            },
            primary: c.primary,
        })
        .collect())
}

/// Fetch events of one calendar within a year of today, recurring events
/// expanded into single instances.
pub async fn fetch_events(config: &GoogleConfig, calendar_id: &str) -> Result<Vec<Event>> {
    let tokens = valid_tokens(config).await?;
    let client = client(config, Some(&tokens));

    let now = Utc::now();
    let time_min = (now - chrono::Duration::days(FETCH_WINDOW_DAYS)).to_rfc3339();
    let time_max = (now + chrono::Duration::days(FETCH_WINDOW_DAYS)).to_rfc3339();

    let response = client
        .events()
        .list_all(
            calendar_id,
            "",                 // i_cal_uid
            0,                  // max_attendees
            OrderBy::default(), // order_by
            &[],                // private_extended_property
            "",                 // q (search query)
            &[],                // shared_extended_property
            false,              // show_deleted
            false,              // show_hidden_invitations
            true,               // single_events
            &time_max,          // time_max
            &time_min,          // time_min
            "",                 // time_zone
            "",                 // updated_min
        )
        .await
        .context("Failed to fetch events")?;

    let events: Vec<Event> = response
        .body
        .into_iter()
        .filter(|event| event.status != "cancelled")
        .map(|event| Event {
            summary: event.summary,
            start: event
                .start
                .as_ref()
                .and_then(|t| display_time(t.date, t.date_time))
                .unwrap_or_default(),
            end: event
                .end
                .as_ref()
                .and_then(|t| display_time(t.date, t.date_time))
                .unwrap_or_default(),
            description: non_empty(event.description),
            location: non_empty(event.location),
        })
        .collect();

    info!(calendar = %calendar_id, events = events.len(), "fetched Google events");
    Ok(events)
}

/// Display form of a Google start/end. Timed values are shown in UTC.
fn display_time(date: Option<NaiveDate>, date_time: Option<DateTime<Utc>>) -> Option<String> {
    match (date_time, date) {
        (Some(dt), _) => Some(display_datetime(dt.naive_utc())),
        (None, Some(d)) => Some(display_date(d)),
        (None, None) => None,
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
