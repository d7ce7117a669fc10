//! Key-value backed registry repositories.
//!
//! Each registry list is stored under its own key as a flat versioned record
//! (`{"version": "1.0.0", "<list>": [...]}`). On load, an absent or empty
//! record falls back to the legacy combined blob once.

use std::marker::PhantomData;
use std::sync::Arc;

use kurasi_core::client::Client;
use kurasi_core::module::MasterModule;
use kurasi_core::repository::EntityRepository;
use kurasi_core::sector::Sector;
use kurasi_core::snapshot::DataSnapshot;
use kurasi_core::storage::{KeyValueStore, keys};
use kurasi_core::{KurasiError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use version_migrate::{MigrationError, Migrator};

use crate::dto::{
    CLIENT_STORE_ENTITY, MODULE_STORE_ENTITY, SECTOR_STORE_ENTITY, create_client_store_migrator,
    create_module_store_migrator, create_sector_store_migrator,
};
use crate::legacy::LegacyBridge;

/// Binds a domain entity to its storage key, migrator and legacy slice.
pub trait StoredEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key of the current-generation record.
    const STORAGE_KEY: &'static str;
    /// Entity name registered in the migrator.
    const ENTITY: &'static str;
    /// Human-readable name for logs.
    const LABEL: &'static str;

    fn migrator() -> std::result::Result<Migrator, MigrationError>;

    /// Extracts this entity's list from the legacy blob.
    fn from_legacy(snapshot: DataSnapshot) -> Vec<Self>;
}

impl StoredEntity for MasterModule {
    const STORAGE_KEY: &'static str = keys::MODULES;
    const ENTITY: &'static str = MODULE_STORE_ENTITY;
    const LABEL: &'static str = "module";

    fn migrator() -> std::result::Result<Migrator, MigrationError> {
        create_module_store_migrator()
    }

    fn from_legacy(snapshot: DataSnapshot) -> Vec<Self> {
        snapshot.master_modules
    }
}

impl StoredEntity for Sector {
    const STORAGE_KEY: &'static str = keys::SECTORS;
    const ENTITY: &'static str = SECTOR_STORE_ENTITY;
    const LABEL: &'static str = "sector";

    fn migrator() -> std::result::Result<Migrator, MigrationError> {
        create_sector_store_migrator()
    }

    fn from_legacy(snapshot: DataSnapshot) -> Vec<Self> {
        snapshot.sectors
    }
}

impl StoredEntity for Client {
    const STORAGE_KEY: &'static str = keys::CLIENTS;
    const ENTITY: &'static str = CLIENT_STORE_ENTITY;
    const LABEL: &'static str = "client";

    fn migrator() -> std::result::Result<Migrator, MigrationError> {
        create_client_store_migrator()
    }

    fn from_legacy(snapshot: DataSnapshot) -> Vec<Self> {
        snapshot.clients
    }
}

/// An [`EntityRepository`] over a [`KeyValueStore`].
pub struct KeyValueEntityRepository<T> {
    store: Arc<dyn KeyValueStore>,
    legacy: Option<LegacyBridge>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: StoredEntity> KeyValueEntityRepository<T> {
    /// Creates a repository that seeds from the legacy blob in the same store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let legacy = LegacyBridge::new(store.clone());
        Self {
            store,
            legacy: Some(legacy),
            _entity: PhantomData,
        }
    }

    /// Creates a repository that never looks at legacy data.
    pub fn without_legacy(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            legacy: None,
            _entity: PhantomData,
        }
    }

    /// Reads the current-generation record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(list))`: the record exists and migrated cleanly
    /// - `Ok(None)`: no record stored
    /// - `Err`: the record is corrupt or the store failed
    fn load_current(&self) -> Result<Option<Vec<T>>> {
        let Some(raw) = self.store.get(T::STORAGE_KEY)? else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            KurasiError::json(format!("Failed to parse '{}' record: {}", T::STORAGE_KEY, e))
        })?;

        let migrator = T::migrator()?;
        let items: Vec<T> = migrator.load_flat_from(T::ENTITY, value).map_err(|e| {
            KurasiError::migration(format!("Failed to migrate '{}' record: {}", T::STORAGE_KEY, e))
        })?;
        Ok(Some(items))
    }

    /// Seeds from the legacy blob when it holds entries for this entity.
    fn seed_from_legacy(&self) -> Result<Option<Vec<T>>> {
        let Some(bridge) = &self.legacy else {
            return Ok(None);
        };
        let Some(snapshot) = bridge.read()? else {
            return Ok(None);
        };
        let seeded = T::from_legacy(snapshot);
        if seeded.is_empty() {
            return Ok(None);
        }

        self.save_all(&seeded)?;
        bridge.backup()?;
        tracing::info!(
            "Migrated {} {} entries from legacy state",
            seeded.len(),
            T::LABEL
        );
        Ok(Some(seeded))
    }
}

impl<T: StoredEntity> EntityRepository<T> for KeyValueEntityRepository<T> {
    fn load_all(&self) -> Result<Vec<T>> {
        let current = self.load_current()?;
        if let Some(items) = current.filter(|items| !items.is_empty()) {
            return Ok(items);
        }
        Ok(self.seed_from_legacy()?.unwrap_or_default())
    }

    fn save_all(&self, items: &[T]) -> Result<()> {
        let migrator = T::migrator()?;
        let domain: Vec<T> = items.to_vec();
        let json_str = migrator.save_domain_flat(T::ENTITY, &domain).map_err(|e| {
            KurasiError::json(format!("Failed to serialize {} list: {}", T::LABEL, e))
        })?;
        self.store.set(T::STORAGE_KEY, &json_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use serde_json::json;

    fn legacy_blob() -> String {
        json!({
            "state": {
                "masterModules": [{"id": 1, "name": "Churn", "config_schema": []}],
                "sectors": [{"id": 2, "name": "Retail", "modules": {}}],
                "clients": []
            }
        })
        .to_string()
    }

    #[test]
    fn test_round_trip_through_store() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let repo: KeyValueEntityRepository<Sector> = KeyValueEntityRepository::new(store.clone());

        repo.save_all(&[Sector::new("s1", "Retail")]).unwrap();
        let raw = store.get(keys::SECTORS).unwrap().unwrap();
        assert!(raw.contains("\"version\""));

        let loaded = repo.load_all().unwrap();
        assert_eq!(loaded, vec![Sector::new("s1", "Retail")]);
    }

    #[test]
    fn test_seeds_from_legacy_once() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(keys::LEGACY_SYSTEM, &legacy_blob()).unwrap();

        let modules: KeyValueEntityRepository<MasterModule> =
            KeyValueEntityRepository::new(store.clone());
        let loaded = modules.load_all().unwrap();

        assert_eq!(loaded[0].id, "1");
        assert!(store.get(keys::MODULES).unwrap().is_some());
        assert!(store.get(keys::LEGACY_SYSTEM_BACKUP).unwrap().is_some());
        // The legacy blob stays until the migration is completed explicitly.
        assert!(store.get(keys::LEGACY_SYSTEM).unwrap().is_some());

        // A non-empty own record wins over the legacy blob from now on.
        modules.save_all(&[MasterModule::new("m9", "Other")]).unwrap();
        let reloaded = modules.load_all().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id, "m9");
    }

    #[test]
    fn test_empty_legacy_slice_is_not_seeded() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(keys::LEGACY_SYSTEM, &legacy_blob()).unwrap();

        let clients: KeyValueEntityRepository<Client> = KeyValueEntityRepository::new(store.clone());
        assert!(clients.load_all().unwrap().is_empty());
        assert!(store.get(keys::CLIENTS).unwrap().is_none());
        assert!(store.get(keys::LEGACY_SYSTEM_BACKUP).unwrap().is_none());
    }

    #[test]
    fn test_without_legacy_ignores_blob() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(keys::LEGACY_SYSTEM, &legacy_blob()).unwrap();

        let repo: KeyValueEntityRepository<Sector> =
            KeyValueEntityRepository::without_legacy(store.clone());
        assert!(repo.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(keys::SECTORS, "{broken").unwrap();

        let repo: KeyValueEntityRepository<Sector> = KeyValueEntityRepository::new(store);
        assert!(repo.load_all().unwrap_err().is_serialization());
    }
}
