//! Atomic file writes with ACID-style guarantees.
//!
//! Provides:
//! - **Atomicity**: tmp file + atomic rename, so readers see old or new content
//! - **Isolation**: an exclusive `fs2` lock on a sibling `.lock` file
//! - **Durability**: explicit fsync before the rename

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use kurasi_core::{KurasiError, Result};

/// Writes `contents` to `path` atomically under an exclusive lock.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let _lock = FileLock::acquire(path)?;

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Removes `path` under the same lock; a missing file is not an error.
pub fn remove_locked(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let _lock = FileLock::acquire(path)?;
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| KurasiError::io(format!("Path has no file name: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let mut lock_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| KurasiError::io(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_atomic(&path, b"{}").unwrap();
        write_atomic(&path, b"{\"a\":1}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
        assert!(!dir.path().join("nested").join("state.json.lock").exists());
    }

    #[test]
    fn test_remove_locked_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.json");

        remove_locked(&path).unwrap();
        write_atomic(&path, b"1").unwrap();
        remove_locked(&path).unwrap();
        assert!(!path.exists());
    }
}
