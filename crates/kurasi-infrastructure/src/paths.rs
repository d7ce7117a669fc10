//! Unified path management for kurasi.
//!
//! All paths are resolved via AppPaths from the version-migrate crate so the
//! layout is consistent across platforms.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/kurasi/            # Config directory (AppPaths default)
//! └── config.toml              # Console configuration
//!
//! ~/.local/share/kurasi/       # Data directory
//! ├── modular_analytics_*.json # Registry records
//! └── auth-storage.json        # Session and preferences
//! ```

use std::path::PathBuf;

use kurasi_core::{KurasiError, Result};
use version_migrate::AppPaths;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Unified path management for kurasi.
pub struct KurasiPaths;

impl KurasiPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("kurasi")
    }

    /// Returns the kurasi configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        Self::app_paths()
            .config_dir()
            .map_err(|e| KurasiError::config(format!("Cannot resolve config directory: {}", e)))
    }

    /// Returns the kurasi data directory.
    pub fn data_dir() -> Result<PathBuf> {
        Self::app_paths()
            .data_dir()
            .map_err(|e| KurasiError::config(format!("Cannot resolve data directory: {}", e)))
    }

    /// Returns the default `config.toml` path.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }
}
