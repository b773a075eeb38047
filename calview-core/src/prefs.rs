//! Small key-value preference store with per-entry expiry.
//!
//! Stored as JSON at `~/.config/calview/prefs.json` by default. Keys are
//! grouped by scope (`source.url`, ...) through [`Scope`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CalViewError, CalViewResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, StoredValue>,
}

impl PreferenceStore {
    /// `~/.config/calview/prefs.json`
    pub fn default_path() -> CalViewResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalViewError::Config("Could not determine config directory".into()))?;
        Ok(config_dir.join("calview").join("prefs.json"))
    }

    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> CalViewResult<Self> {
        let path = path.into();

        if !path.exists() {
            return Ok(PreferenceStore {
                path,
                entries: BTreeMap::new(),
            });
        }

        let contents = std::fs::read_to_string(&path)?;
        let entries = serde_json::from_str(&contents).map_err(|e| {
            CalViewError::Preferences(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(PreferenceStore { path, entries })
    }

    /// Like [`PreferenceStore::open`], but an unreadable or corrupt file
    /// gives an empty store at the same path. Saving it overwrites the file.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match PreferenceStore::open(path.clone()) {
            Ok(store) => store,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable preferences");
                PreferenceStore {
                    path,
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`, unless missing or expired at `now`.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|stored| !stored.is_expired(now))
            .map(|stored| stored.value.as_str())
    }

    /// Store `value`. With a `ttl` the entry expires at `now + ttl`; a
    /// non-positive or out-of-range `ttl` is rejected.
    pub fn set(
        &mut self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> CalViewResult<()> {
        let expires_at = match ttl {
            Some(ttl) if ttl <= Duration::zero() => {
                return Err(CalViewError::Preferences(format!(
                    "expiry for '{}' must be positive",
                    key
                )));
            }
            Some(ttl) => Some(now.checked_add_signed(ttl).ok_or_else(|| {
                CalViewError::Preferences(format!("expiry for '{}' is out of range", key))
            })?),
            None => None,
        };

        self.entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, stored| !stored.is_expired(now));
        before - self.entries.len()
    }

    pub fn save(&self) -> CalViewResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved preferences");
        Ok(())
    }

    /// View of the keys under `name.`
    pub fn scope<'a>(&'a mut self, name: &'a str) -> Scope<'a> {
        Scope { store: self, name }
    }
}

/// Keys of one scope inside a [`PreferenceStore`].
pub struct Scope<'a> {
    store: &'a mut PreferenceStore,
    name: &'a str,
}

impl Scope<'_> {
    fn key(&self, key: &str) -> String {
        format!("{}.{}", self.name, key)
    }

    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<&str> {
        self.store.get(&self.key(key), now)
    }

    pub fn set(
        &mut self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> CalViewResult<()> {
        let key = self.key(key);
        self.store.set(&key, value, ttl, now)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let key = self.key(key);
        self.store.remove(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        assert_eq!(store.get("source.url", noon()), None);
    }

    #[test]
    fn test_values_expire() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        store
            .set("source.url", "https://example.com/a.ics", Some(Duration::days(30)), noon())
            .expect("set");

        assert_eq!(
            store.get("source.url", noon() + Duration::days(29)),
            Some("https://example.com/a.ics")
        );
        assert_eq!(store.get("source.url", noon() + Duration::days(30)), None);
    }

    #[test]
    fn test_values_without_ttl_never_expire() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        store.set("view.month", "2024-03", None, noon()).expect("set");

        assert_eq!(store.get("view.month", noon() + Duration::days(3650)), Some("2024-03"));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PreferenceStore::open(&path).expect("open");
        store
            .scope("source")
            .set("url", "https://example.com/a.ics", Some(Duration::days(1)), noon())
            .expect("set");
        store.save().expect("save");

        let mut reopened = PreferenceStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("source.url", noon()), Some("https://example.com/a.ics"));
        assert_eq!(
            reopened.scope("source").get("url", noon()),
            Some("https://example.com/a.ics")
        );
    }

    #[test]
    fn test_scope_remove() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        store.scope("source").set("url", "x", None, noon()).expect("set");
        assert!(store.scope("source").remove("url"));
        assert!(!store.scope("source").remove("url"));
        assert_eq!(store.get("source.url", noon()), None);
    }

    #[test]
    fn test_purge_expired() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        store.set("a", "1", Some(Duration::hours(1)), noon()).expect("set");
        store.set("b", "2", None, noon()).expect("set");

        assert_eq!(store.purge_expired(noon() + Duration::hours(2)), 1);
        assert_eq!(store.get("b", noon()), Some("2"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = PreferenceStore::open(&path).unwrap_err();
        assert!(matches!(err, CalViewError::Preferences(_)));
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").expect("write");

        let mut store = PreferenceStore::open_or_empty(&path);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.get("source.url", noon()), None);

        store.set("source.url", "u", None, noon()).expect("set");
        store.save().expect("save");
        let reopened = PreferenceStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("source.url", noon()), Some("u"));
    }

    #[test]
    fn test_huge_ttl_is_rejected_not_panicking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        let ttl = Duration::try_days(100_000_000).expect("representable duration");
        let err = store.set("source.url", "u", Some(ttl), noon()).unwrap_err();

        assert!(matches!(err, CalViewError::Preferences(_)));
        assert_eq!(store.get("source.url", noon()), None);
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).expect("open");

        assert!(store.set("a", "1", Some(Duration::zero()), noon()).is_err());
        assert!(store.set("a", "1", Some(Duration::days(-1)), noon()).is_err());
        assert!(store.set("a", "1", Some(Duration::seconds(1)), noon()).is_ok());
    }
}
