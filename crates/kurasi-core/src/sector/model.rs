use serde::{Deserialize, Serialize};

use crate::module::ModuleMap;

/// Represents a sector: a category-level set of module defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Unique sector identifier
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Module instances keyed by module id. May reference modules that no
    /// longer exist in the catalog; those are treated as absent.
    #[serde(default)]
    pub modules: ModuleMap,
}

impl Sector {
    /// Creates an empty sector with no modules assigned.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            modules: ModuleMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Partial update for a [`Sector`].
///
/// `modules` replaces the whole map when given; per-module edits go through
/// the registry's module operations instead.
#[derive(Debug, Clone, Default)]
pub struct SectorPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub modules: Option<ModuleMap>,
}

impl SectorPatch {
    pub(crate) fn apply(self, sector: &mut Sector) {
        if let Some(name) = self.name {
            sector.name = name;
        }
        if let Some(description) = self.description {
            sector.description = description;
        }
        if let Some(category) = self.category {
            sector.category = category;
        }
        if let Some(modules) = self.modules {
            sector.modules = modules;
        }
    }
}
