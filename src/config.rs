use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Days a cached source URL is remembered
const DEFAULT_URL_TTL_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// How long the last fetched URL is reused when no source is given
    #[serde(default = "default_url_ttl_days")]
    pub url_ttl_days: i64,

    /// OAuth credentials for Google Calendar
    #[serde(default)]
    pub google: Option<GoogleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url_ttl_days: DEFAULT_URL_TTL_DAYS,
            google: None,
        }
    }
}

/// OAuth credentials for Google Calendar
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

fn default_url_ttl_days() -> i64 {
    DEFAULT_URL_TTL_DAYS
}

impl Config {
    /// Lifetime of the cached source URL. Must be a positive, representable
    /// number of days.
    pub fn url_ttl(&self) -> Result<chrono::Duration> {
        if self.url_ttl_days <= 0 {
            anyhow::bail!("url_ttl_days must be positive, got {}", self.url_ttl_days);
        }
        chrono::Duration::try_days(self.url_ttl_days)
            .with_context(|| format!("url_ttl_days is out of range: {}", self.url_ttl_days))
    }

    pub fn google(&self) -> Result<&GoogleConfig> {
        self.google.as_ref().with_context(|| {
            format!(
                "Google credentials missing.\n\n\
                Add them to {}:\n\n\
                [google]\n\
                client_id = \"your-client-id.apps.googleusercontent.com\"\n\
                client_secret = \"your-client-secret\"",
                config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string())
            )
        })
    }
}

/// Tokens for the signed-in Google account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AccountTokens {
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at <= chrono::Utc::now())
    }
}

/// Get the config directory path (~/.config/calview)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calview");
    Ok(config_dir)
}

/// Get the config file path (~/.config/calview/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the tokens file path (~/.config/calview/tokens.json)
pub fn tokens_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("tokens.json"))
}

/// Load config from ~/.config/calview/config.toml, or defaults if absent
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &std::path::Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    config
        .url_ttl()
        .with_context(|| format!("Invalid config file at {}", path.display()))?;

    Ok(config)
}

/// Load tokens from ~/.config/calview/tokens.json. None when not signed in.
pub fn load_tokens() -> Result<Option<AccountTokens>> {
    let path = tokens_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read tokens file at {}", path.display()))?;

    let tokens: AccountTokens = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse tokens file at {}", path.display()))?;

    Ok(Some(tokens))
}

/// Save tokens to ~/.config/calview/tokens.json
pub fn save_tokens(tokens: &AccountTokens) -> Result<()> {
    let path = tokens_path()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write tokens file at {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("config.toml")).expect("load");

        assert_eq!(config.url_ttl_days, 30);
        assert!(config.google.is_none());
        assert!(config.google().is_err());
    }

    #[test]
    fn test_parse_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "url_ttl_days = 7\n\n[google]\nclient_id = \"id\"\nclient_secret = \"secret\"\n",
        )
        .expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.url_ttl_days, 7);
        assert_eq!(config.google().expect("google").client_id, "id");
    }

    #[test]
    fn test_token_expiry() {
        let mut tokens = AccountTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: None,
        };
        assert!(!tokens.is_expired());

        tokens.expires_at = Some(chrono::Utc::now() - chrono::Duration::minutes(1));
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_url_ttl_bounds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        for bad in ["0", "-3", "9223372036854775807"] {
            std::fs::write(&path, format!("url_ttl_days = {}\n", bad)).expect("write");
            assert!(load_config_from(&path).is_err(), "url_ttl_days = {} accepted", bad);
        }

        std::fs::write(&path, "url_ttl_days = 1\n").expect("write");
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.url_ttl().expect("ttl"), chrono::Duration::days(1));
    }
}
