//! Bridge to the first-generation combined state blob.
//!
//! The first console generation persisted sectors, clients and the module
//! catalog together under `modular_analytics_system`, either wrapped as
//! `{"state": {...}}` or as the bare object. The split registries seed
//! themselves from it once, through [`LegacyBridge`].

use std::sync::Arc;

use kurasi_core::Result;
use kurasi_core::snapshot::{DataSnapshot, coerce_identifiers};
use kurasi_core::storage::{KeyValueStore, keys};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Reads, backs up and removes the legacy blob.
#[derive(Clone)]
pub struct LegacyBridge {
    store: Arc<dyn KeyValueStore>,
}

fn decode_list<T: DeserializeOwned>(state: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(items) = state.get(key).filter(|v| v.is_array()) else {
        return Vec::new();
    };
    match serde_json::from_value(items.clone()) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Ignoring unreadable legacy '{}' list: {}", key, e);
            Vec::new()
        }
    }
}

impl LegacyBridge {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn has_legacy_data(&self) -> Result<bool> {
        Ok(self.store.get(keys::LEGACY_SYSTEM)?.is_some())
    }

    /// Parses the legacy blob.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(snapshot))`: the blob exists; missing lists read as empty
    /// - `Ok(None)`: no blob, or the blob is not a JSON object (logged)
    /// - `Err`: the store itself failed
    pub fn read(&self) -> Result<Option<DataSnapshot>> {
        let Some(raw) = self.store.get(keys::LEGACY_SYSTEM)? else {
            return Ok(None);
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Legacy state blob is not valid JSON, ignoring it: {}", e);
                return Ok(None);
            }
        };
        let Value::Object(outer) = parsed else {
            tracing::warn!("Legacy state blob is not an object, ignoring it");
            return Ok(None);
        };
        let wrapped = match outer.get("state") {
            Some(Value::Object(inner)) => Some(inner.clone()),
            _ => None,
        };
        let state = wrapped.unwrap_or(outer);

        // Same identifier coercion as imports: old data used numeric ids.
        let mut state = Value::Object(state);
        coerce_identifiers(&mut state);
        let Value::Object(state) = state else {
            return Ok(None);
        };

        Ok(Some(DataSnapshot {
            sectors: decode_list(&state, "sectors"),
            clients: decode_list(&state, "clients"),
            master_modules: decode_list(&state, "masterModules"),
        }))
    }

    /// Copies the legacy blob to the backup key, if the blob exists.
    pub fn backup(&self) -> Result<()> {
        if let Some(raw) = self.store.get(keys::LEGACY_SYSTEM)? {
            self.store.set(keys::LEGACY_SYSTEM_BACKUP, &raw)?;
            tracing::debug!("Legacy state blob backed up");
        }
        Ok(())
    }

    /// Removes the legacy blob. The backup copy stays.
    pub fn remove(&self) -> Result<()> {
        self.store.remove(keys::LEGACY_SYSTEM)?;
        tracing::info!("Legacy state blob removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use serde_json::json;

    fn bridge_with(blob: &str) -> (LegacyBridge, Arc<MemoryKeyValueStore>) {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(keys::LEGACY_SYSTEM, blob).unwrap();
        (LegacyBridge::new(store.clone()), store)
    }

    #[test]
    fn test_reads_wrapped_state() {
        let blob = json!({
            "state": {
                "masterModules": [{"id": 5, "name": "Churn", "config_schema": []}],
                "sectors": [{"id": "s1", "name": "Retail", "modules": {"5": {"is_active": true, "prompt": "", "config_values": {}}}}]
            },
            "version": 0
        });
        let (bridge, _) = bridge_with(&blob.to_string());

        let snapshot = bridge.read().unwrap().unwrap();
        assert_eq!(snapshot.master_modules[0].id, "5");
        assert!(snapshot.sectors[0].modules.contains_key("5"));
        assert!(snapshot.clients.is_empty());
    }

    #[test]
    fn test_reads_bare_state() {
        let blob = json!({"clients": [{"id": 9, "name": "Acme", "project_id": ""}]});
        let (bridge, _) = bridge_with(&blob.to_string());

        let snapshot = bridge.read().unwrap().unwrap();
        assert_eq!(snapshot.clients[0].client_id, "9");
        assert_eq!(snapshot.clients[0].project_id, 0);
    }

    #[test]
    fn test_unparsable_blob_reads_as_absent() {
        let (bridge, _) = bridge_with("{not json");
        assert!(bridge.has_legacy_data().unwrap());
        assert_eq!(bridge.read().unwrap(), None);
    }

    #[test]
    fn test_backup_then_remove() {
        let (bridge, store) = bridge_with("{}");
        bridge.backup().unwrap();
        bridge.remove().unwrap();

        assert_eq!(store.get(keys::LEGACY_SYSTEM).unwrap(), None);
        assert_eq!(
            store.get(keys::LEGACY_SYSTEM_BACKUP).unwrap().as_deref(),
            Some("{}")
        );
        assert!(!bridge.has_legacy_data().unwrap());
    }
}
