//! Sector record DTOs and migrations.

use kurasi_core::sector::Sector;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Sector record V1.0.0, stored under `modular_analytics_sectors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct SectorStoreV1_0_0 {
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

impl IntoDomain<Vec<Sector>> for SectorStoreV1_0_0 {
    fn into_domain(self) -> Vec<Sector> {
        self.sectors
    }
}

impl FromDomain<Vec<Sector>> for SectorStoreV1_0_0 {
    fn from_domain(sectors: Vec<Sector>) -> Self {
        SectorStoreV1_0_0 { sectors }
    }
}

pub const SECTOR_STORE_ENTITY: &str = "sector_store";

/// Creates a Migrator for the sector record.
pub fn create_sector_store_migrator() -> Result<version_migrate::Migrator, version_migrate::MigrationError> {
    let mut migrator = version_migrate::Migrator::builder().build();
    let path = version_migrate::Migrator::define(SECTOR_STORE_ENTITY)
        .from::<SectorStoreV1_0_0>()
        .into_with_save::<Vec<Sector>>();
    migrator.register(path)?;
    Ok(migrator)
}
