//! Key-value preference storage.
//!
//! The launcher keeps exactly one value, the search location, but the store
//! is a plain string map so the file stays readable and editable by hand.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the configured search directory is stored.
pub const SEARCH_LOCATION: &str = "PATH";

/// Fallback returned for an unset search location.
pub const UNSET_SENTINEL: &str = "nil";

const PREFERENCES_FILE: &str = "preferences.json";

pub trait PreferenceStore {
    fn string_with_fallback(&self, key: &str, fallback: &str) -> String;
    fn set_string(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Reads the configured search directory, mapping the sentinel to `None`.
pub fn configured_dir(store: &dyn PreferenceStore) -> Option<PathBuf> {
    let raw = store.string_with_fallback(SEARCH_LOCATION, UNSET_SENTINEL);
    if raw == UNSET_SENTINEL {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

pub fn default_preferences_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "runbox", "runbox")
        .map(|dirs| dirs.config_dir().join(PREFERENCES_FILE))
}

/// Preferences persisted as a JSON object next to the other per-user config.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Loads `path`. A missing file starts empty; an unparsable one is
    /// logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed preferences");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "opened preferences");
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferences {
    fn string_with_fallback(&self, key: &str, fallback: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist() {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

/// Process-local preferences, used when the platform has no config
/// directory and as a fake in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn with_search_location(dir: impl AsRef<Path>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(
            SEARCH_LOCATION.to_string(),
            dir.as_ref().to_string_lossy().to_string(),
        );
        Self { values }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn string_with_fallback(&self, key: &str, fallback: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn test_root(name: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        std::env::temp_dir().join(format!("runbox-prefs-{name}-{nonce}"))
    }

    #[test]
    fn unset_location_maps_to_none() {
        let store = MemoryPreferences::default();
        assert_eq!(
            store.string_with_fallback(SEARCH_LOCATION, UNSET_SENTINEL),
            "nil"
        );
        assert_eq!(configured_dir(&store), None);
    }

    #[test]
    fn stored_location_is_returned() {
        let store = MemoryPreferences::with_search_location("/opt/tools");
        assert_eq!(configured_dir(&store), Some(PathBuf::from("/opt/tools")));
    }

    #[test]
    fn file_preferences_survive_reopen() {
        let root = test_root("reopen");
        let file = root.join("nested").join(PREFERENCES_FILE);

        let mut store = FilePreferences::open(&file);
        assert_eq!(configured_dir(&store), None);
        store
            .set_string(SEARCH_LOCATION, "/srv/scripts")
            .expect("set location");

        let reopened = FilePreferences::open(&file);
        assert_eq!(reopened.path(), file.as_path());
        assert_eq!(
            configured_dir(&reopened),
            Some(PathBuf::from("/srv/scripts"))
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn malformed_file_starts_empty() {
        let root = test_root("malformed");
        fs::create_dir_all(&root).expect("create root");
        let file = root.join(PREFERENCES_FILE);
        fs::write(&file, "{not json").expect("write garbage");

        let store = FilePreferences::open(&file);
        assert_eq!(configured_dir(&store), None);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let root = test_root("blocked");
        fs::create_dir_all(&root).expect("create root");
        // A regular file where the parent directory should be blocks the write.
        let blocker = root.join("blocker");
        fs::write(&blocker, "x").expect("write blocker");
        let mut store = FilePreferences::open(blocker.join(PREFERENCES_FILE));

        assert!(store.set_string(SEARCH_LOCATION, "/tmp").is_err());
        assert_eq!(configured_dir(&store), None);
        let _ = fs::remove_dir_all(&root);
    }
}
