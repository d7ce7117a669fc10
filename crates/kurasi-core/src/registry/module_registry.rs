use std::sync::Arc;

use super::collection::EntityCollection;
use crate::entity_module::OpOutcome;
use crate::error::Result;
use crate::module::{MasterModule, ModulePatch};
use crate::repository::EntityRepository;

/// The canonical catalog of master modules.
///
/// Deleting a module here does not touch sectors or clients; use the
/// cross-registry cascade for that.
pub struct ModuleRegistry {
    modules: EntityCollection<MasterModule>,
}

impl ModuleRegistry {
    /// Creates the registry, loading the stored catalog.
    pub fn new(repository: Arc<dyn EntityRepository<MasterModule>>) -> Result<Self> {
        Ok(Self {
            modules: EntityCollection::load(repository, "module")?,
        })
    }

    /// Returns a snapshot of all modules.
    pub fn modules(&self) -> Vec<MasterModule> {
        self.modules.snapshot()
    }

    pub fn get_module_by_id(&self, id: &str) -> Option<MasterModule> {
        self.modules.find(|m| m.id == id)
    }

    /// Appends a module to the catalog.
    pub fn add_module(&self, module: MasterModule) -> Result<()> {
        tracing::info!("Adding master module '{}'", module.id);
        self.modules.apply_always(|list| list.push(module))
    }

    /// Applies `patch` to the module with `id`.
    pub fn update_module(&self, id: &str, patch: ModulePatch) -> Result<OpOutcome> {
        self.modules.apply(|list| match list.iter_mut().find(|m| m.id == id) {
            Some(module) => {
                patch.apply(module);
                OpOutcome::Applied
            }
            None => OpOutcome::EntityNotFound,
        })
    }

    /// Removes the module with `id` from the catalog only.
    pub fn delete_module(&self, id: &str) -> Result<OpOutcome> {
        self.modules.apply(|list| {
            let before = list.len();
            list.retain(|m| m.id != id);
            if list.len() < before {
                OpOutcome::Applied
            } else {
                OpOutcome::EntityNotFound
            }
        })
    }

    /// Replaces the whole catalog.
    pub fn set_modules(&self, modules: Vec<MasterModule>) -> Result<()> {
        self.modules.replace(modules)
    }

    pub fn clear_modules(&self) -> Result<()> {
        self.modules.replace(Vec::new())
    }
}
