//! Master module domain module.
//!
//! # Module Structure
//!
//! - `model`: Catalog entry (`MasterModule`), schema fields, config values and
//!   the per-entity `ModuleInstance`
//!
//! # Usage
//!
//! ```ignore
//! use kurasi_core::module::{MasterModule, ModuleInstance, create_default_config_values};
//! ```

mod model;

// Re-export public API
pub use model::{
    ConfigField, ConfigValue, ConfigValues, MasterModule, ModuleInstance, ModuleMap, ModulePatch,
    create_default_config_values,
};
