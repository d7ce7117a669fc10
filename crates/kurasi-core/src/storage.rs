//! Key-value storage abstraction for persisted console state.
//!
//! Values are JSON text. Keys are flat names such as
//! `modular_analytics_sectors`; see the `keys` module for the full list.

use crate::error::Result;

/// A string-keyed store of JSON text values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Storage keys used by the console.
pub mod keys {
    /// Current-generation module catalog record.
    pub const MODULES: &str = "modular_analytics_modules";
    /// Current-generation sector record.
    pub const SECTORS: &str = "modular_analytics_sectors";
    /// Current-generation client record.
    pub const CLIENTS: &str = "modular_analytics_clients";
    /// Legacy combined blob holding all three lists.
    pub const LEGACY_SYSTEM: &str = "modular_analytics_system";
    /// Copy of the legacy blob written when it is first migrated.
    pub const LEGACY_SYSTEM_BACKUP: &str = "modular_analytics_system_backup";
    /// Persisted auth record (session and dark-mode preference).
    pub const AUTH: &str = "auth-storage";
    /// Legacy "is logged in" marker.
    pub const LEGACY_AUTH: &str = "modular_analytics_auth";
}
