//! Module catalog record DTOs and migrations.

use kurasi_core::module::MasterModule;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Module catalog record V1.0.0, stored under `modular_analytics_modules`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ModuleStoreV1_0_0 {
    #[serde(default, rename = "masterModules")]
    pub master_modules: Vec<MasterModule>,
}

impl IntoDomain<Vec<MasterModule>> for ModuleStoreV1_0_0 {
    fn into_domain(self) -> Vec<MasterModule> {
        self.master_modules
    }
}

impl FromDomain<Vec<MasterModule>> for ModuleStoreV1_0_0 {
    fn from_domain(master_modules: Vec<MasterModule>) -> Self {
        ModuleStoreV1_0_0 { master_modules }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

pub const MODULE_STORE_ENTITY: &str = "module_store";

/// Creates a Migrator for the module catalog record.
pub fn create_module_store_migrator() -> Result<version_migrate::Migrator, version_migrate::MigrationError> {
    let mut migrator = version_migrate::Migrator::builder().build();
    let path = version_migrate::Migrator::define(MODULE_STORE_ENTITY)
        .from::<ModuleStoreV1_0_0>()
        .into_with_save::<Vec<MasterModule>>();
    migrator.register(path)?;
    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_store_load_flat() {
        let migrator = create_module_store_migrator().unwrap();
        let value = json!({
            "version": "1.0.0",
            "masterModules": [{"id": "m1", "name": "Churn", "config_schema": []}]
        });

        let modules: Vec<MasterModule> = migrator.load_flat_from(MODULE_STORE_ENTITY, value).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, "m1");
    }

    #[test]
    fn test_module_store_save_flat() {
        let migrator = create_module_store_migrator().unwrap();
        let modules = vec![MasterModule::new("m1", "Churn")];

        let json_str = migrator.save_domain_flat(MODULE_STORE_ENTITY, &modules).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["masterModules"][0]["id"], "m1");
    }
}
