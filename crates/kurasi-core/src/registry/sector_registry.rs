use std::sync::Arc;

use super::collection::EntityCollection;
use super::module_registry::ModuleRegistry;
use crate::entity_module::{self, OpOutcome};
use crate::error::Result;
use crate::module::{ConfigValues, ModuleInstance};
use crate::repository::EntityRepository;
use crate::sector::{Sector, SectorPatch};

/// Sectors and their Level-1 module configuration.
///
/// Sector instances never carry an override flag; every module operation
/// delegates to the engine without override marking.
pub struct SectorRegistry {
    sectors: EntityCollection<Sector>,
    modules: Arc<ModuleRegistry>,
}

impl SectorRegistry {
    /// Creates the registry, loading stored sectors.
    ///
    /// # Arguments
    ///
    /// * `repository` - Persistence for the sector list
    /// * `modules` - Catalog used to resolve module assignments
    pub fn new(repository: Arc<dyn EntityRepository<Sector>>, modules: Arc<ModuleRegistry>) -> Result<Self> {
        Ok(Self {
            sectors: EntityCollection::load(repository, "sector")?,
            modules,
        })
    }

    // ============================================================================
    // Sector CRUD
    // ============================================================================

    pub fn sectors(&self) -> Vec<Sector> {
        self.sectors.snapshot()
    }

    pub fn get_sector_by_id(&self, id: &str) -> Option<Sector> {
        self.sectors.find(|s| s.id == id)
    }

    /// Returns the sector's instance of `module_id`, if both exist.
    pub fn sector_module(&self, sector_id: &str, module_id: &str) -> Option<ModuleInstance> {
        self.get_sector_by_id(sector_id)
            .and_then(|sector| sector.modules.get(module_id).cloned())
    }

    pub fn add_sector(&self, sector: Sector) -> Result<()> {
        tracing::info!("Adding sector '{}'", sector.id);
        self.sectors.apply_always(|list| list.push(sector))
    }

    pub fn update_sector(&self, id: &str, patch: SectorPatch) -> Result<OpOutcome> {
        self.sectors.apply(|list| match list.iter_mut().find(|s| s.id == id) {
            Some(sector) => {
                patch.apply(sector);
                OpOutcome::Applied
            }
            None => OpOutcome::EntityNotFound,
        })
    }

    /// Deletes a sector. Clients pointing at it keep their `sector_id` and
    /// simply stop resolving it.
    pub fn delete_sector(&self, id: &str) -> Result<OpOutcome> {
        self.sectors.apply(|list| {
            let before = list.len();
            list.retain(|s| s.id != id);
            if list.len() < before {
                OpOutcome::Applied
            } else {
                OpOutcome::EntityNotFound
            }
        })
    }

    pub fn set_sectors(&self, sectors: Vec<Sector>) -> Result<()> {
        self.sectors.replace(sectors)
    }

    pub fn clear_sectors(&self) -> Result<()> {
        self.sectors.replace(Vec::new())
    }

    // ============================================================================
    // Module operations
    // ============================================================================

    /// Assigns a catalog module with schema defaults, inactive, empty prompt.
    pub fn assign_sector_module(&self, sector_id: &str, module_id: &str) -> Result<OpOutcome> {
        let Some(master) = self.modules.get_module_by_id(module_id) else {
            tracing::debug!("module '{}' not in catalog, cannot assign to sector", module_id);
            return Ok(OpOutcome::ModuleNotFound);
        };
        self.sectors
            .apply(|list| entity_module::assign_module(list, sector_id, module_id, &master, None))
    }

    pub fn unassign_sector_module(&self, sector_id: &str, module_id: &str) -> Result<OpOutcome> {
        self.sectors
            .apply(|list| entity_module::unassign_module(list, sector_id, module_id))
    }

    pub fn toggle_sector_module_active(&self, sector_id: &str, module_id: &str) -> Result<OpOutcome> {
        self.sectors
            .apply(|list| entity_module::toggle_module_active(list, sector_id, module_id, false))
    }

    pub fn update_sector_module_prompt(&self, sector_id: &str, module_id: &str, prompt: &str) -> Result<OpOutcome> {
        self.sectors.apply(|list| {
            entity_module::update_module_prompt(list, sector_id, module_id, prompt, false)
        })
    }

    pub fn update_sector_module_config(
        &self,
        sector_id: &str,
        module_id: &str,
        config_values: ConfigValues,
    ) -> Result<OpOutcome> {
        self.sectors.apply(|list| {
            entity_module::update_module_config(list, sector_id, module_id, config_values, None)
        })
    }

    /// Strips `module_id` from every sector, returning how many held it.
    pub fn remove_module_from_all_sectors(&self, module_id: &str) -> Result<usize> {
        self.sectors
            .apply_counted(|list| entity_module::remove_module_from_all(list, module_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ConfigField, ConfigValue, MasterModule};
    use crate::repository::InMemoryRepository;

    fn setup() -> (SectorRegistry, Arc<InMemoryRepository<Sector>>) {
        let modules = Arc::new(
            ModuleRegistry::new(Arc::new(InMemoryRepository::with_items(vec![
                MasterModule::new("m1", "Churn").with_field(ConfigField::new("a").with_default(0)),
            ])))
            .unwrap(),
        );
        let repo = Arc::new(InMemoryRepository::with_items(vec![Sector::new("s1", "Retail")]));
        let registry = SectorRegistry::new(repo.clone(), modules).unwrap();
        (registry, repo)
    }

    #[test]
    fn test_assign_sector_module_uses_schema_defaults() {
        let (registry, repo) = setup();
        assert_eq!(
            registry.assign_sector_module("s1", "m1").unwrap(),
            OpOutcome::Applied
        );

        let instance = registry.sector_module("s1", "m1").unwrap();
        assert!(!instance.is_active);
        assert_eq!(instance.config_values["a"], ConfigValue::from(0));
        assert_eq!(instance.is_override, None);
        assert!(repo.stored()[0].modules.contains_key("m1"));
    }

    #[test]
    fn test_assign_unknown_module_is_noop() {
        let (registry, repo) = setup();
        assert_eq!(
            registry.assign_sector_module("s1", "ghost").unwrap(),
            OpOutcome::ModuleNotFound
        );
        assert!(registry.get_sector_by_id("s1").unwrap().modules.is_empty());
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_sector_module_edits_never_mark_override() {
        let (registry, _) = setup();
        registry.assign_sector_module("s1", "m1").unwrap();
        registry.toggle_sector_module_active("s1", "m1").unwrap();
        registry.update_sector_module_prompt("s1", "m1", "summarize").unwrap();

        let instance = registry.sector_module("s1", "m1").unwrap();
        assert!(instance.is_active);
        assert_eq!(instance.prompt, "summarize");
        assert_eq!(instance.is_override, None);
    }

    #[test]
    fn test_update_and_delete_sector() {
        let (registry, _) = setup();
        let outcome = registry
            .update_sector(
                "s1",
                SectorPatch {
                    name: Some("Retail EU".to_string()),
                    ..SectorPatch::default()
                },
            )
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(registry.get_sector_by_id("s1").unwrap().name, "Retail EU");

        assert_eq!(registry.delete_sector("nope").unwrap(), OpOutcome::EntityNotFound);
        assert_eq!(registry.delete_sector("s1").unwrap(), OpOutcome::Applied);
        assert!(registry.sectors().is_empty());
    }

    #[test]
    fn test_remove_module_from_all_sectors() {
        let (registry, _) = setup();
        registry.add_sector(Sector::new("s2", "Banking")).unwrap();
        registry.assign_sector_module("s1", "m1").unwrap();
        registry.assign_sector_module("s2", "m1").unwrap();

        assert_eq!(registry.remove_module_from_all_sectors("m1").unwrap(), 2);
        assert!(registry.sectors().iter().all(|s| s.modules.is_empty()));
    }
}
