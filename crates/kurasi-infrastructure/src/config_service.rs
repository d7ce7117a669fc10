//! Configuration service implementation.
//!
//! Loads [`ConsoleConfig`] from `config.toml` (platform config directory or an
//! explicit path) through the versioned migrator, then applies `KURASI_*`
//! environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use kurasi_core::config::ConsoleConfig;
use kurasi_core::{KurasiError, Result};
use serde_json::Value as JsonValue;

use crate::dto::{CONSOLE_CONFIG_ENTITY, create_console_config_migrator};
use crate::paths::KurasiPaths;

/// Version assumed for hand-written config files without a `version` key.
const UNVERSIONED_CONFIG_VERSION: &str = "1.0.0";

/// Configuration service bound to one `config.toml` path.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Creates a service for `path`, or for the platform default when `None`.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => KurasiPaths::config_file()?,
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration file. A missing or empty file yields defaults.
    pub fn load(&self) -> Result<ConsoleConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {}, using defaults", self.path.display());
            return Ok(ConsoleConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            KurasiError::io(format!(
                "Failed to read config file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        if content.trim().is_empty() {
            return Ok(ConsoleConfig::default());
        }

        let toml_value: toml::Value = toml::from_str(&content)?;
        let mut json_value = serde_json::to_value(toml_value)?;
        if let JsonValue::Object(map) = &mut json_value {
            map.entry("version")
                .or_insert_with(|| JsonValue::String(UNVERSIONED_CONFIG_VERSION.to_string()));
        }

        let migrator = create_console_config_migrator()?;
        let config: ConsoleConfig = migrator
            .load_flat_from(CONSOLE_CONFIG_ENTITY, json_value)
            .map_err(|e| {
                KurasiError::config(format!(
                    "Failed to load config file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;
        tracing::debug!("Loaded config from {}", self.path.display());
        Ok(config)
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn load_with_env(&self) -> Result<ConsoleConfig> {
        let mut config = self.load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::new(Some(dir.path().join("config.toml"))).unwrap();
        assert_eq!(service.load().unwrap(), ConsoleConfig::default());
    }

    #[test]
    fn test_unversioned_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[admin]\nusername = \"ops\"\npassword = \"pw\"\n").unwrap();

        let config = ConfigService::new(Some(path)).unwrap().load().unwrap();
        assert_eq!(config.admin.username, "ops");
        assert_eq!(config.admin.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_loading_never_rewrites_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let original = "[admin]\npassword = \"pw\"\n";
        fs::write(&path, original).unwrap();

        let service = ConfigService::new(Some(path.clone())).unwrap();
        service.load_with_env().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[admin\n").unwrap();

        let err = ConfigService::new(Some(path)).unwrap().load().unwrap_err();
        assert!(err.is_serialization());
    }
}
