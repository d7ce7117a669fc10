//! Key-value backed auth record repository.

use std::sync::Arc;

use kurasi_core::auth::{AuthRecord, AuthRepository};
use kurasi_core::storage::{KeyValueStore, keys};
use kurasi_core::{KurasiError, Result};
use serde_json::Value;

use crate::dto::{AUTH_STATE_ENTITY, create_auth_state_migrator};

const LEGACY_FLAG_VALUE: &str = "true";

/// Stores the [`AuthRecord`] under `auth-storage` and reads the legacy
/// `modular_analytics_auth` marker.
pub struct KeyValueAuthRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueAuthRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the first-generation record shape: `{"state": {"darkMode": bool}, "version": 0}`.
    fn read_legacy_shape(value: &Value) -> Option<AuthRecord> {
        let state = value.get("state")?.as_object()?;
        Some(AuthRecord {
            dark_mode: state.get("darkMode").and_then(Value::as_bool).unwrap_or(false),
            session: None,
        })
    }
}

impl AuthRepository for KeyValueAuthRepository {
    fn load(&self) -> Result<AuthRecord> {
        let Some(raw) = self.store.get(keys::AUTH)? else {
            return Ok(AuthRecord::default());
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Auth record is not valid JSON, starting signed out: {}", e);
                return Ok(AuthRecord::default());
            }
        };

        if let Some(record) = Self::read_legacy_shape(&value) {
            tracing::debug!("Read auth record in legacy shape");
            return Ok(record);
        }

        let migrator = create_auth_state_migrator()?;
        let loaded: std::result::Result<AuthRecord, _> =
            migrator.load_flat_from(AUTH_STATE_ENTITY, value);
        match loaded {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!("Auth record could not be migrated, starting signed out: {}", e);
                Ok(AuthRecord::default())
            }
        }
    }

    fn save(&self, record: &AuthRecord) -> Result<()> {
        let migrator = create_auth_state_migrator()?;
        let json_str = migrator
            .save_domain_flat(AUTH_STATE_ENTITY, record)
            .map_err(|e| KurasiError::json(format!("Failed to serialize auth record: {}", e)))?;
        self.store.set(keys::AUTH, &json_str)
    }

    fn legacy_flag(&self) -> Result<bool> {
        Ok(self.store.get(keys::LEGACY_AUTH)?.as_deref() == Some(LEGACY_FLAG_VALUE))
    }

    fn clear_legacy_flag(&self) -> Result<()> {
        self.store.remove(keys::LEGACY_AUTH)
    }
}
