//! Console bootstrap.
//!
//! Builds every service over one key-value store. Registries are created in
//! dependency order: module catalog, then sectors, then clients.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use kurasi_core::clock::{Clock, SystemClock};
use kurasi_core::client::Client;
use kurasi_core::config::{AdminConfig, ConsoleConfig};
use kurasi_core::module::MasterModule;
use kurasi_core::registry::{ClientRegistry, ModuleRegistry, SectorRegistry};
use kurasi_core::remote::RemoteBlobStore;
use kurasi_core::sector::Sector;
use kurasi_core::storage::KeyValueStore;
use kurasi_infrastructure::{
    FileKeyValueStore, HttpBlobStore, KeyValueAuthRepository, KeyValueEntityRepository,
    KurasiPaths, LegacyBridge,
};

use crate::auth_service::AuthService;
use crate::data_operations::DataOperations;
use crate::remote_sync::RemoteSync;

/// All console services, wired together.
pub struct AdminConsole {
    modules: Arc<ModuleRegistry>,
    sectors: Arc<SectorRegistry>,
    clients: Arc<ClientRegistry>,
    operations: Arc<DataOperations>,
    auth: Arc<AuthService>,
    remote: Arc<RemoteSync>,
}

impl AdminConsole {
    /// Opens the console over the file store in the configured data directory,
    /// with the system clock and the HTTP remote store.
    pub fn open(config: &ConsoleConfig) -> Result<Self> {
        let data_dir = Self::resolve_data_dir(config)?;
        tracing::debug!("Using data directory {}", data_dir.display());
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(data_dir));
        let remote: Arc<dyn RemoteBlobStore> = Arc::new(
            HttpBlobStore::new(&config.remote).context("Failed to set up remote store")?,
        );
        Self::with_parts(store, Arc::new(SystemClock), remote, config.admin.clone())
    }

    /// Configured data directory, or the platform default.
    pub fn resolve_data_dir(config: &ConsoleConfig) -> Result<PathBuf> {
        match &config.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => KurasiPaths::data_dir().context("Failed to resolve data directory"),
        }
    }

    /// Wires the console from explicit parts.
    pub fn with_parts(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        remote: Arc<dyn RemoteBlobStore>,
        admin: AdminConfig,
    ) -> Result<Self> {
        let modules = Arc::new(
            ModuleRegistry::new(Arc::new(KeyValueEntityRepository::<MasterModule>::new(
                store.clone(),
            )))
            .context("Failed to load module catalog")?,
        );
        let sectors = Arc::new(
            SectorRegistry::new(
                Arc::new(KeyValueEntityRepository::<Sector>::new(store.clone())),
                modules.clone(),
            )
            .context("Failed to load sectors")?,
        );
        let clients = Arc::new(
            ClientRegistry::new(
                Arc::new(KeyValueEntityRepository::<Client>::new(store.clone())),
                modules.clone(),
                sectors.clone(),
            )
            .context("Failed to load clients")?,
        );

        let operations = Arc::new(DataOperations::new(
            modules.clone(),
            sectors.clone(),
            clients.clone(),
            LegacyBridge::new(store.clone()),
        ));
        let auth = Arc::new(
            AuthService::new(Arc::new(KeyValueAuthRepository::new(store)), clock, admin)
                .context("Failed to load auth state")?,
        );
        let remote = Arc::new(RemoteSync::new(remote, operations.clone()));

        Ok(Self {
            modules,
            sectors,
            clients,
            operations,
            auth,
            remote,
        })
    }

    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    pub fn sectors(&self) -> &Arc<SectorRegistry> {
        &self.sectors
    }

    pub fn clients(&self) -> &Arc<ClientRegistry> {
        &self.clients
    }

    pub fn operations(&self) -> &Arc<DataOperations> {
        &self.operations
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    pub fn remote(&self) -> &Arc<RemoteSync> {
        &self.remote
    }
}
