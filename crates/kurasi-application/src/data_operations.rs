//! Cross-registry operations.
//!
//! `DataOperations` is the only place that touches more than one registry at
//! a time: cascade deletes, export/import/clear of the whole console state,
//! and completion of the legacy migration.

use std::sync::Arc;

use kurasi_core::Result;
use kurasi_core::registry::{ClientRegistry, ModuleRegistry, SectorRegistry};
use kurasi_core::snapshot::{DataSnapshot, parse_import_document};
use kurasi_infrastructure::LegacyBridge;
use serde::Serialize;

/// What a cascade delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub clients_updated: usize,
    pub sectors_updated: usize,
    pub removed_from_catalog: bool,
}

/// Entries written per registry by an import. `None` means the key was absent
/// and the registry was left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub modules: Option<usize>,
    pub sectors: Option<usize>,
    pub clients: Option<usize>,
}

pub struct DataOperations {
    modules: Arc<ModuleRegistry>,
    sectors: Arc<SectorRegistry>,
    clients: Arc<ClientRegistry>,
    legacy: LegacyBridge,
}

impl DataOperations {
    pub fn new(
        modules: Arc<ModuleRegistry>,
        sectors: Arc<SectorRegistry>,
        clients: Arc<ClientRegistry>,
        legacy: LegacyBridge,
    ) -> Self {
        Self {
            modules,
            sectors,
            clients,
            legacy,
        }
    }

    /// Removes a master module and every reference to it.
    ///
    /// Clients are cleaned first, then sectors, then the catalog; each step is
    /// persisted before the next starts. A failure part-way leaves at worst an
    /// unreferenced catalog entry, never a reference to a missing module.
    pub fn delete_module_cascade(&self, module_id: &str) -> Result<CascadeReport> {
        let clients_updated = self
            .clients
            .remove_module_from_all_clients(module_id)
            .inspect_err(|e| {
                tracing::warn!("Cascade delete of '{}' stopped at clients: {}", module_id, e)
            })?;
        let sectors_updated = self
            .sectors
            .remove_module_from_all_sectors(module_id)
            .inspect_err(|e| {
                tracing::warn!("Cascade delete of '{}' stopped at sectors: {}", module_id, e)
            })?;
        let removed_from_catalog = self.modules.delete_module(module_id)?.is_applied();

        tracing::info!(
            "Deleted module '{}' ({} clients, {} sectors, catalog entry: {})",
            module_id,
            clients_updated,
            sectors_updated,
            removed_from_catalog
        );
        Ok(CascadeReport {
            clients_updated,
            sectors_updated,
            removed_from_catalog,
        })
    }

    /// Current state of all three registries.
    pub fn snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            sectors: self.sectors.sectors(),
            clients: self.clients.clients(),
            master_modules: self.modules.modules(),
        }
    }

    /// Serializes the whole state as pretty-printed JSON.
    pub fn export_state(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Replaces registry contents from an import document.
    ///
    /// The document is fully validated and decoded before any registry is
    /// touched. Present keys replace their registry wholesale in the order
    /// modules, sectors, clients; absent keys leave it as it was.
    ///
    /// # Errors
    ///
    /// `KurasiError::Validation` for malformed documents, with every registry
    /// unchanged. Persistence failures are passed through.
    pub fn import_state(&self, json_text: &str) -> Result<ImportReport> {
        let document = parse_import_document(json_text).inspect_err(|e| {
            tracing::warn!("Rejected import document: {}", e);
        })?;

        let mut report = ImportReport::default();
        if let Some(modules) = document.master_modules {
            report.modules = Some(modules.len());
            self.modules.set_modules(modules)?;
        }
        if let Some(sectors) = document.sectors {
            report.sectors = Some(sectors.len());
            self.sectors.set_sectors(sectors)?;
        }
        if let Some(clients) = document.clients {
            report.clients = Some(clients.len());
            self.clients.set_clients(clients)?;
        }

        tracing::info!(
            "Imported state (modules: {:?}, sectors: {:?}, clients: {:?})",
            report.modules,
            report.sectors,
            report.clients
        );
        Ok(report)
    }

    /// Empties all three registries.
    pub fn clear_state(&self) -> Result<()> {
        self.clients.clear_clients()?;
        self.sectors.clear_sectors()?;
        self.modules.clear_modules()?;
        tracing::info!("Cleared all console state");
        Ok(())
    }

    /// Removes the legacy combined blob. Its backup copy stays.
    pub fn complete_legacy_migration(&self) -> Result<bool> {
        if !self.legacy.has_legacy_data()? {
            tracing::debug!("No legacy state blob to remove");
            return Ok(false);
        }
        self.legacy.remove()?;
        Ok(true)
    }
}
