use crate::prefs::{configured_dir, PreferenceStore, SEARCH_LOCATION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{}: {source}", path.display())]
    PathInvalid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to save search location: {0:#}")]
    Persist(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsState {
    Closed,
    Open,
}

/// Edit state of the settings window. The draft is only written to the
/// preference store by a successful [`SettingsFlow::save`].
#[derive(Debug)]
pub struct SettingsFlow {
    state: SettingsState,
    pub draft: String,
}

impl Default for SettingsFlow {
    fn default() -> Self {
        Self {
            state: SettingsState::Closed,
            draft: String::new(),
        }
    }
}

impl SettingsFlow {
    pub fn state(&self) -> SettingsState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SettingsState::Open
    }

    pub fn open(&mut self, store: &dyn PreferenceStore) {
        self.draft = configured_dir(store)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        self.state = SettingsState::Open;
    }

    pub fn cancel(&mut self) {
        self.state = SettingsState::Closed;
        self.draft.clear();
    }

    pub fn set_draft_path(&mut self, path: &Path) {
        self.draft = path.to_string_lossy().to_string();
    }

    /// Persists the draft if it names an existing path. On any error the
    /// window stays open and the store is untouched.
    pub fn save(&mut self, store: &mut dyn PreferenceStore) -> Result<PathBuf, SettingsError> {
        let path = PathBuf::from(&self.draft);
        if let Err(source) = fs::metadata(&path) {
            if source.kind() == io::ErrorKind::NotFound {
                return Err(SettingsError::PathInvalid { path, source });
            }
            tracing::debug!(path = %path.display(), %source, "saving path that could not be inspected");
        }

        store
            .set_string(SEARCH_LOCATION, &self.draft)
            .map_err(SettingsError::Persist)?;
        tracing::info!(path = %path.display(), "saved search location");
        self.state = SettingsState::Closed;
        self.draft.clear();
        Ok(path)
    }
}
