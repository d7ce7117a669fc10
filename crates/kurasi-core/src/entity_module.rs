//! Entity-module operation engine.
//!
//! Sectors and clients both carry a map of module instances keyed by module id.
//! The functions in this module implement every per-instance operation once,
//! generically over [`HasModuleMap`], so the sector and client registries only
//! decide *which* inherited instance and override policy to pass in.
//!
//! All operations work in place on a slice of entities and leave every
//! non-target entity untouched. A lookup miss is reported through
//! [`OpOutcome`] and never creates an entry.

use crate::client::Client;
use crate::module::{
    ConfigValues, MasterModule, ModuleInstance, ModuleMap, create_default_config_values,
};
use crate::sector::Sector;

/// An entity that owns a module-instance map.
pub trait HasModuleMap {
    /// Returns the identifier used to address this entity.
    fn entity_id(&self) -> &str;

    /// Returns the entity's module instances.
    fn modules(&self) -> &ModuleMap;

    /// Returns the entity's module instances for mutation.
    fn modules_mut(&mut self) -> &mut ModuleMap;
}

impl HasModuleMap for Sector {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    fn modules_mut(&mut self) -> &mut ModuleMap {
        &mut self.modules
    }
}

impl HasModuleMap for Client {
    fn entity_id(&self) -> &str {
        &self.client_id
    }

    fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    fn modules_mut(&mut self) -> &mut ModuleMap {
        &mut self.modules
    }
}

/// Result of a per-entity mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    /// The state changed.
    Applied,
    /// The entity id did not resolve; nothing changed.
    EntityNotFound,
    /// The module id did not resolve on the entity or in the catalog; nothing changed.
    ModuleNotFound,
}

impl OpOutcome {
    pub fn is_applied(self) -> bool {
        self == OpOutcome::Applied
    }
}

fn find_entity_mut<'a, E: HasModuleMap>(entities: &'a mut [E], entity_id: &str) -> Option<&'a mut E> {
    entities.iter_mut().find(|e| e.entity_id() == entity_id)
}

/// Applies `f` to the instance of `module_id` on `entity_id`, if both exist.
fn with_instance<E, F>(entities: &mut [E], entity_id: &str, module_id: &str, f: F) -> OpOutcome
where
    E: HasModuleMap,
    F: FnOnce(&mut ModuleInstance),
{
    let Some(entity) = find_entity_mut(entities, entity_id) else {
        tracing::debug!("entity '{}' not found, skipping module operation", entity_id);
        return OpOutcome::EntityNotFound;
    };
    let Some(instance) = entity.modules_mut().get_mut(module_id) else {
        tracing::debug!(
            "module '{}' not assigned to entity '{}', skipping",
            module_id,
            entity_id
        );
        return OpOutcome::ModuleNotFound;
    };
    f(instance);
    OpOutcome::Applied
}

/// Builds an instance of `master_module`, inheriting from `inherited` when given.
///
/// Starts from the schema defaults and overlays the inherited value of every
/// schema field the parent carries. Keys outside the schema are not copied.
fn build_instance(master_module: &MasterModule, inherited: Option<&ModuleInstance>) -> ModuleInstance {
    let mut config_values = create_default_config_values(master_module);
    if let Some(parent) = inherited {
        for (name, value) in config_values.iter_mut() {
            if let Some(parent_value) = parent.config_values.get(name) {
                *value = parent_value.clone();
            }
        }
    }

    match inherited {
        Some(parent) => ModuleInstance {
            is_active: parent.is_active,
            prompt: parent.prompt.clone(),
            config_values,
            is_override: Some(false),
        },
        None => ModuleInstance {
            is_active: false,
            prompt: String::new(),
            config_values,
            is_override: None,
        },
    }
}

/// Assigns `master_module` to an entity, replacing any existing instance.
///
/// # Arguments
///
/// * `entities` - The entity list to operate on
/// * `entity_id` - Target entity
/// * `module_id` - Key under which the instance is stored
/// * `master_module` - Catalog entry whose schema seeds the config values
/// * `inherited` - Parent instance to inherit from (sector instance for clients)
pub fn assign_module<E: HasModuleMap>(
    entities: &mut [E],
    entity_id: &str,
    module_id: &str,
    master_module: &MasterModule,
    inherited: Option<&ModuleInstance>,
) -> OpOutcome {
    let Some(entity) = find_entity_mut(entities, entity_id) else {
        tracing::debug!("entity '{}' not found, cannot assign '{}'", entity_id, module_id);
        return OpOutcome::EntityNotFound;
    };
    let instance = build_instance(master_module, inherited);
    entity.modules_mut().insert(module_id.to_string(), instance);
    OpOutcome::Applied
}

/// Removes a module instance from an entity.
pub fn unassign_module<E: HasModuleMap>(entities: &mut [E], entity_id: &str, module_id: &str) -> OpOutcome {
    let Some(entity) = find_entity_mut(entities, entity_id) else {
        return OpOutcome::EntityNotFound;
    };
    match entity.modules_mut().remove(module_id) {
        Some(_) => OpOutcome::Applied,
        None => OpOutcome::ModuleNotFound,
    }
}

/// Flips `is_active`. With `mark_as_override`, also forces `is_override = true`.
pub fn toggle_module_active<E: HasModuleMap>(
    entities: &mut [E],
    entity_id: &str,
    module_id: &str,
    mark_as_override: bool,
) -> OpOutcome {
    with_instance(entities, entity_id, module_id, |instance| {
        instance.is_active = !instance.is_active;
        if mark_as_override {
            instance.is_override = Some(true);
        }
    })
}

/// Replaces the prompt. With `mark_as_override`, also forces `is_override = true`.
pub fn update_module_prompt<E: HasModuleMap>(
    entities: &mut [E],
    entity_id: &str,
    module_id: &str,
    prompt: &str,
    mark_as_override: bool,
) -> OpOutcome {
    with_instance(entities, entity_id, module_id, |instance| {
        instance.prompt = prompt.to_string();
        if mark_as_override {
            instance.is_override = Some(true);
        }
    })
}

/// Replaces the whole `config_values` map.
///
/// `is_override` is written only when given; `None` keeps the previous flag
/// exactly, including its absence.
pub fn update_module_config<E: HasModuleMap>(
    entities: &mut [E],
    entity_id: &str,
    module_id: &str,
    config_values: ConfigValues,
    is_override: Option<bool>,
) -> OpOutcome {
    with_instance(entities, entity_id, module_id, |instance| {
        instance.config_values = config_values;
        if let Some(flag) = is_override {
            instance.is_override = Some(flag);
        }
    })
}

/// Sets (`Some`) or clears (`None`) the override flag without touching anything else.
pub fn set_module_override<E: HasModuleMap>(
    entities: &mut [E],
    entity_id: &str,
    module_id: &str,
    is_override: Option<bool>,
) -> OpOutcome {
    with_instance(entities, entity_id, module_id, |instance| {
        instance.is_override = is_override;
    })
}

/// Strips `module_id` from every entity.
///
/// # Returns
///
/// The number of entities that held the module.
pub fn remove_module_from_all<E: HasModuleMap>(entities: &mut [E], module_id: &str) -> usize {
    entities
        .iter_mut()
        .filter_map(|entity| entity.modules_mut().remove(module_id))
        .count()
}
