//! Client record DTOs and migrations.

use kurasi_core::client::Client;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Client record V1.0.0, stored under `modular_analytics_clients`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ClientStoreV1_0_0 {
    #[serde(default)]
    pub clients: Vec<Client>,
}

impl IntoDomain<Vec<Client>> for ClientStoreV1_0_0 {
    fn into_domain(self) -> Vec<Client> {
        self.clients
    }
}

impl FromDomain<Vec<Client>> for ClientStoreV1_0_0 {
    fn from_domain(clients: Vec<Client>) -> Self {
        ClientStoreV1_0_0 { clients }
    }
}

pub const CLIENT_STORE_ENTITY: &str = "client_store";

/// Creates a Migrator for the client record.
pub fn create_client_store_migrator() -> Result<version_migrate::Migrator, version_migrate::MigrationError> {
    let mut migrator = version_migrate::Migrator::builder().build();
    let path = version_migrate::Migrator::define(CLIENT_STORE_ENTITY)
        .from::<ClientStoreV1_0_0>()
        .into_with_save::<Vec<Client>>();
    migrator.register(path)?;
    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_store_reads_string_project_id() {
        let migrator = create_client_store_migrator().unwrap();
        let value = json!({
            "version": "1.0.0",
            "clients": [{"client_id": "c1", "name": "Acme", "project_id": "12"}]
        });

        let clients: Vec<Client> = migrator.load_flat_from(CLIENT_STORE_ENTITY, value).unwrap();
        assert_eq!(clients[0].project_id, 12);
    }
}
