use std::sync::Arc;

use super::collection::EntityCollection;
use super::module_registry::ModuleRegistry;
use super::sector_registry::SectorRegistry;
use crate::client::{Client, ClientPatch};
use crate::entity_module::{self, HasModuleMap, OpOutcome};
use crate::error::Result;
use crate::module::{ConfigValues, ModuleInstance};
use crate::repository::EntityRepository;

/// Clients and their module instances.
///
/// Client instances inherit from the client's sector at creation and at
/// assignment time. Hand edits through toggle/prompt mark the instance as an
/// override, which shields it from [`ClientRegistry::resync_client_module`]
/// and [`ClientRegistry::propagate_sector_module`].
pub struct ClientRegistry {
    clients: EntityCollection<Client>,
    modules: Arc<ModuleRegistry>,
    sectors: Arc<SectorRegistry>,
}

fn copy_from_sector(target: &mut ModuleInstance, source: &ModuleInstance) {
    target.is_active = source.is_active;
    target.prompt = source.prompt.clone();
    target.config_values = source.config_values.clone();
    target.is_override = Some(false);
}

impl ClientRegistry {
    /// Creates the registry, loading stored clients.
    ///
    /// # Arguments
    ///
    /// * `repository` - Persistence for the client list
    /// * `modules` - Catalog used to resolve module assignments
    /// * `sectors` - Source of inherited module instances
    pub fn new(
        repository: Arc<dyn EntityRepository<Client>>,
        modules: Arc<ModuleRegistry>,
        sectors: Arc<SectorRegistry>,
    ) -> Result<Self> {
        Ok(Self {
            clients: EntityCollection::load(repository, "client")?,
            modules,
            sectors,
        })
    }

    // ============================================================================
    // Client CRUD
    // ============================================================================

    pub fn clients(&self) -> Vec<Client> {
        self.clients.snapshot()
    }

    pub fn get_client_by_id(&self, client_id: &str) -> Option<Client> {
        self.clients.find(|c| c.client_id == client_id)
    }

    /// Adds a client.
    ///
    /// When the client's sector exists and has modules assigned, the client's
    /// module map starts as a copy of the sector's map at this instant.
    pub fn add_client(&self, mut client: Client) -> Result<()> {
        if let Some(sector) = client
            .sector_id
            .as_deref()
            .and_then(|id| self.sectors.get_sector_by_id(id))
        {
            if !sector.modules.is_empty() {
                tracing::debug!(
                    "Client '{}' inherits {} modules from sector '{}'",
                    client.client_id,
                    sector.modules.len(),
                    sector.id
                );
                client.modules = sector.modules;
            }
        }
        tracing::info!("Adding client '{}'", client.client_id);
        self.clients.apply_always(|list| list.push(client))
    }

    pub fn update_client(&self, client_id: &str, patch: ClientPatch) -> Result<OpOutcome> {
        self.clients
            .apply(|list| match list.iter_mut().find(|c| c.client_id == client_id) {
                Some(client) => {
                    patch.apply(client);
                    OpOutcome::Applied
                }
                None => OpOutcome::EntityNotFound,
            })
    }

    pub fn delete_client(&self, client_id: &str) -> Result<OpOutcome> {
        self.clients.apply(|list| {
            let before = list.len();
            list.retain(|c| c.client_id != client_id);
            if list.len() < before {
                OpOutcome::Applied
            } else {
                OpOutcome::EntityNotFound
            }
        })
    }

    pub fn set_clients(&self, clients: Vec<Client>) -> Result<()> {
        self.clients.replace(clients)
    }

    pub fn clear_clients(&self) -> Result<()> {
        self.clients.replace(Vec::new())
    }

    // ============================================================================
    // Module operations
    // ============================================================================

    /// Returns the sector instance a client would inherit for `module_id`.
    fn inherited_instance(&self, client: &Client, module_id: &str) -> Option<ModuleInstance> {
        client
            .sector_id
            .as_deref()
            .and_then(|sector_id| self.sectors.sector_module(sector_id, module_id))
    }

    /// Assigns a catalog module to a client.
    ///
    /// Values come from the sector's instance when there is one, then from the
    /// schema defaults. The new instance always tracks its sector
    /// (`is_override == Some(false)`).
    pub fn assign_client_module(&self, client_id: &str, module_id: &str) -> Result<OpOutcome> {
        let Some(client) = self.get_client_by_id(client_id) else {
            tracing::debug!("client '{}' not found, cannot assign '{}'", client_id, module_id);
            return Ok(OpOutcome::EntityNotFound);
        };
        let Some(master) = self.modules.get_module_by_id(module_id) else {
            tracing::debug!("module '{}' not in catalog, cannot assign to client", module_id);
            return Ok(OpOutcome::ModuleNotFound);
        };
        let inherited = self.inherited_instance(&client, module_id);

        self.clients.apply(|list| {
            let outcome =
                entity_module::assign_module(list, client_id, module_id, &master, inherited.as_ref());
            if outcome.is_applied() {
                entity_module::set_module_override(list, client_id, module_id, Some(false));
            }
            outcome
        })
    }

    pub fn unassign_client_module(&self, client_id: &str, module_id: &str) -> Result<OpOutcome> {
        self.clients
            .apply(|list| entity_module::unassign_module(list, client_id, module_id))
    }

    /// Flips `is_active` and marks the instance as an override.
    pub fn toggle_client_module_active(&self, client_id: &str, module_id: &str) -> Result<OpOutcome> {
        self.clients
            .apply(|list| entity_module::toggle_module_active(list, client_id, module_id, true))
    }

    /// Replaces the prompt and marks the instance as an override.
    pub fn update_client_module_prompt(&self, client_id: &str, module_id: &str, prompt: &str) -> Result<OpOutcome> {
        self.clients.apply(|list| {
            entity_module::update_module_prompt(list, client_id, module_id, prompt, true)
        })
    }

    /// Replaces the config values; the override flag changes only when given.
    pub fn update_client_module_config(
        &self,
        client_id: &str,
        module_id: &str,
        config_values: ConfigValues,
        is_override: Option<bool>,
    ) -> Result<OpOutcome> {
        self.clients.apply(|list| {
            entity_module::update_module_config(list, client_id, module_id, config_values, is_override)
        })
    }

    /// Re-copies a tracking instance from the client's sector.
    ///
    /// Overrides, instances the client does not hold, and modules the sector
    /// does not hold are left alone (`ModuleNotFound`).
    pub fn resync_client_module(&self, client_id: &str, module_id: &str) -> Result<OpOutcome> {
        let Some(client) = self.get_client_by_id(client_id) else {
            return Ok(OpOutcome::EntityNotFound);
        };
        let Some(source) = self.inherited_instance(&client, module_id) else {
            return Ok(OpOutcome::ModuleNotFound);
        };

        self.clients.apply(|list| {
            let Some(client) = list.iter_mut().find(|c| c.client_id == client_id) else {
                return OpOutcome::EntityNotFound;
            };
            match client.modules_mut().get_mut(module_id) {
                Some(instance) if !instance.is_overridden() => {
                    copy_from_sector(instance, &source);
                    OpOutcome::Applied
                }
                Some(_) => {
                    tracing::debug!(
                        "client '{}' overrides '{}', not resyncing",
                        client_id,
                        module_id
                    );
                    OpOutcome::ModuleNotFound
                }
                None => OpOutcome::ModuleNotFound,
            }
        })
    }

    /// Pushes a sector's instance to every tracking client of that sector.
    ///
    /// # Returns
    ///
    /// The number of clients updated.
    pub fn propagate_sector_module(&self, sector_id: &str, module_id: &str) -> Result<usize> {
        let Some(source) = self.sectors.sector_module(sector_id, module_id) else {
            return Ok(0);
        };

        let updated = self.clients.apply_counted(|list| {
            let mut count = 0;
            let tracking = list
                .iter_mut()
                .filter(|c| c.sector_id.as_deref() == Some(sector_id))
                .filter_map(|c| c.modules.get_mut(module_id))
                .filter(|instance| !instance.is_overridden());
            for instance in tracking {
                copy_from_sector(instance, &source);
                count += 1;
            }
            count
        })?;
        tracing::info!(
            "Propagated '{}' from sector '{}' to {} clients",
            module_id,
            sector_id,
            updated
        );
        Ok(updated)
    }

    /// Strips `module_id` from every client, returning how many held it.
    pub fn remove_module_from_all_clients(&self, module_id: &str) -> Result<usize> {
        self.clients
            .apply_counted(|list| entity_module::remove_module_from_all(list, module_id))
    }
}
