//! Auth record persistence.

use serde::{Deserialize, Serialize};

use super::session::AuthSession;
use crate::error::Result;

/// Persisted auth state: the dark-mode preference and the active session, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<AuthSession>,
}

/// An abstract store for the auth record and the legacy login marker.
pub trait AuthRepository: Send + Sync {
    /// Loads the record; a missing record reads as the default.
    fn load(&self) -> Result<AuthRecord>;

    fn save(&self, record: &AuthRecord) -> Result<()>;

    /// Whether the first-generation "logged in" marker is set.
    fn legacy_flag(&self) -> Result<bool>;

    /// Removes the first-generation marker. Removing an absent marker is fine.
    fn clear_legacy_flag(&self) -> Result<()>;
}
