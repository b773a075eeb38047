use anyhow::Result;
use calview_core::prefs::PreferenceStore;

use super::{SOURCE_SCOPE, URL_KEY};

/// Drop the cached source URL. An unreadable store is replaced.
pub fn run() -> Result<()> {
    let mut prefs = PreferenceStore::open_or_empty(PreferenceStore::default_path()?);
    let removed = prefs.scope(SOURCE_SCOPE).remove(URL_KEY);
    prefs.save()?;

    if removed {
        println!("Forgot cached calendar URL ({}).", prefs.path().display());
    } else {
        println!("No cached calendar URL in {}.", prefs.path().display());
    }

    Ok(())
}
