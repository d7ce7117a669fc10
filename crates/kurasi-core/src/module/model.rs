//! Master module domain models.
//!
//! A master module is a reusable analytics capability definition. Sectors and
//! clients never own a module; they attach a [`ModuleInstance`] keyed by the
//! module's `id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A single configuration value as stored in a module instance.
///
/// Values are deliberately untyped beyond the three JSON scalars the console
/// accepts; the config schema decides what a field means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl ConfigValue {
    /// The value used when neither an inherited value nor a schema default exists.
    pub fn empty() -> Self {
        ConfigValue::Text(String::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(Number::from(value))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

/// Field name → value mapping of one module instance.
pub type ConfigValues = BTreeMap<String, ConfigValue>;

/// One entry of a module's configuration schema.
///
/// Only `name` and `default` carry meaning for the engine. Presentation keys
/// (label, type, options, ...) are kept in `extra` so they survive
/// load/save and import/export untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigField {
    /// Creates a schema field without a default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            extra: Map::new(),
        }
    }

    /// Sets the declared default value.
    pub fn with_default(mut self, default: impl Into<ConfigValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A catalog entry describing an analytics module and its config schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterModule {
    /// Globally unique, immutable identifier.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub query_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tab: String,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub config_schema: Vec<ConfigField>,
}

impl MasterModule {
    /// Creates a module with empty descriptive fields and no schema.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            query_name: String::new(),
            description: String::new(),
            tab: String::new(),
            metrics: Vec::new(),
            config_schema: Vec::new(),
        }
    }

    /// Appends a field to the config schema.
    pub fn with_field(mut self, field: ConfigField) -> Self {
        self.config_schema.push(field);
        self
    }
}

/// Partial update for a [`MasterModule`]. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ModulePatch {
    pub name: Option<String>,
    pub query_name: Option<String>,
    pub description: Option<String>,
    pub tab: Option<String>,
    pub metrics: Option<Vec<String>>,
    pub config_schema: Option<Vec<ConfigField>>,
}

impl ModulePatch {
    pub(crate) fn apply(self, module: &mut MasterModule) {
        if let Some(name) = self.name {
            module.name = name;
        }
        if let Some(query_name) = self.query_name {
            module.query_name = query_name;
        }
        if let Some(description) = self.description {
            module.description = description;
        }
        if let Some(tab) = self.tab {
            module.tab = tab;
        }
        if let Some(metrics) = self.metrics {
            module.metrics = metrics;
        }
        if let Some(config_schema) = self.config_schema {
            module.config_schema = config_schema;
        }
    }
}

/// A module's configuration as attached to one sector or one client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleInstance {
    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub config_values: ConfigValues,

    /// Client-only divergence marker.
    ///
    /// `None` or `Some(false)`: the instance tracks its sector.
    /// `Some(true)`: hand-edited, must not be resynced from the sector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_override: Option<bool>,
}

impl ModuleInstance {
    pub fn is_overridden(&self) -> bool {
        self.is_override == Some(true)
    }
}

/// Module id → instance mapping held by sectors and clients.
pub type ModuleMap = BTreeMap<String, ModuleInstance>;

/// Builds the config values of an unconfigured instance of `module`.
///
/// Every schema field maps to its declared default, or to an empty string when
/// the schema declares none. Sector and client assignment both seed from here.
pub fn create_default_config_values(module: &MasterModule) -> ConfigValues {
    module
        .config_schema
        .iter()
        .map(|field| {
            let value = field.default.clone().unwrap_or_else(ConfigValue::empty);
            (field.name.clone(), value)
        })
        .collect()
}
