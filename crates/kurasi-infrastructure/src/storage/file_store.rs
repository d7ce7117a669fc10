use std::fs;
use std::path::{Path, PathBuf};

use kurasi_core::storage::KeyValueStore;
use kurasi_core::{KurasiError, Result};

use super::atomic::{remove_locked, write_atomic};

/// A key-value store keeping one `<key>.json` file per key in a directory.
///
/// # Directory Structure
///
/// ```text
/// <data_dir>/
/// ├── modular_analytics_modules.json
/// ├── modular_analytics_sectors.json
/// ├── modular_analytics_clients.json
/// └── auth-storage.json
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(KurasiError::validation(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KurasiError::io(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tracing::debug!("Writing {} bytes to {}", value.len(), path.display());
        write_atomic(&path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        remove_locked(&path)
    }
}
