use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("Search location is empty")]
    ConfigMissing,
    #[error("failed to read directory {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Lists the names of the non-directory children of `dir` in the order the
/// OS reports them. Symlinks count as files even when they point at a
/// directory.
pub fn list_files(dir: &Path) -> Result<Vec<String>, ListError> {
    let unreadable = |source| ListError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let file_type = entry.file_type().map_err(unreadable)?;
        if file_type.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                tracing::warn!(name = ?raw, dir = %dir.display(), "skipping non UTF-8 file name");
            }
        }
    }
    Ok(names)
}

/// Loads the file list for the configured directory, if one is set.
pub fn load_entries(configured: Option<&Path>) -> Result<Vec<String>, ListError> {
    let dir = configured.ok_or(ListError::ConfigMissing)?;
    let names = list_files(dir)?;
    tracing::info!(dir = %dir.display(), count = names.len(), "loaded file list");
    Ok(names)
}
