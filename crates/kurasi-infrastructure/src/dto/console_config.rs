//! Console configuration DTOs and migrations.

use kurasi_core::config::{AdminConfig, ConsoleConfig, RemoteConfig, StorageConfig};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Console configuration V1.0.0 (`config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConsoleConfigV1_0_0 {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl IntoDomain<ConsoleConfig> for ConsoleConfigV1_0_0 {
    fn into_domain(self) -> ConsoleConfig {
        ConsoleConfig {
            admin: self.admin,
            remote: self.remote,
            storage: self.storage,
        }
    }
}

impl FromDomain<ConsoleConfig> for ConsoleConfigV1_0_0 {
    fn from_domain(config: ConsoleConfig) -> Self {
        ConsoleConfigV1_0_0 {
            admin: config.admin,
            remote: config.remote,
            storage: config.storage,
        }
    }
}

pub const CONSOLE_CONFIG_ENTITY: &str = "console_config";

/// Creates a Migrator for the console configuration.
///
/// # Example
///
/// ```ignore
/// let migrator = create_console_config_migrator()?;
/// let config: ConsoleConfig = migrator.load_flat_from(CONSOLE_CONFIG_ENTITY, toml_value)?;
/// ```
pub fn create_console_config_migrator() -> Result<version_migrate::Migrator, version_migrate::MigrationError> {
    let mut migrator = version_migrate::Migrator::builder().build();
    let path = version_migrate::Migrator::define(CONSOLE_CONFIG_ENTITY)
        .from::<ConsoleConfigV1_0_0>()
        .into_with_save::<ConsoleConfig>();
    migrator.register(path)?;
    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_config_migration_from_toml() {
        let migrator = create_console_config_migrator().unwrap();
        let toml_str = r#"
version = "1.0.0"

[admin]
username = "ops"

[remote]
base_url = "https://hooks.example.test"
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();

        let config: ConsoleConfig = migrator
            .load_flat_from(CONSOLE_CONFIG_ENTITY, toml_value)
            .unwrap();
        assert_eq!(config.admin.username, "ops");
        assert_eq!(config.remote.base_url, "https://hooks.example.test");
        assert_eq!(config.remote.timeout_secs, 30);
    }
}
