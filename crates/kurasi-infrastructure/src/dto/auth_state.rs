//! Auth record DTOs and migrations.

use kurasi_core::auth::{AuthRecord, AuthSession};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Auth record V1.0.0, stored under `auth-storage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct AuthStateV1_0_0 {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<AuthSession>,
}

impl IntoDomain<AuthRecord> for AuthStateV1_0_0 {
    fn into_domain(self) -> AuthRecord {
        AuthRecord {
            dark_mode: self.dark_mode,
            session: self.session,
        }
    }
}

impl FromDomain<AuthRecord> for AuthStateV1_0_0 {
    fn from_domain(record: AuthRecord) -> Self {
        AuthStateV1_0_0 {
            dark_mode: record.dark_mode,
            session: record.session,
        }
    }
}

pub const AUTH_STATE_ENTITY: &str = "auth_state";

/// Creates a Migrator for the auth record.
pub fn create_auth_state_migrator() -> Result<version_migrate::Migrator, version_migrate::MigrationError> {
    let mut migrator = version_migrate::Migrator::builder().build();
    let path = version_migrate::Migrator::define(AUTH_STATE_ENTITY)
        .from::<AuthStateV1_0_0>()
        .into_with_save::<AuthRecord>();
    migrator.register(path)?;
    Ok(migrator)
}
