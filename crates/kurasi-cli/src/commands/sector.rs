use anyhow::{Result, bail};
use clap::Subcommand;
use kurasi_application::AdminConsole;
use kurasi_core::module::ConfigValue;
use kurasi_core::sector::{Sector, SectorPatch};
use kurasi_core::validation::{validate_all, validate_no_duplicate, validate_required};

use super::{describe_instance, ensure_applied, generated_id, merged_config, parse_config_pair};

#[derive(Subcommand, Debug)]
pub enum SectorAction {
    /// List sectors and their modules
    List,
    /// Print one sector as JSON
    Show { sector_id: String },
    /// Create a sector
    Add {
        #[arg(long)]
        name: String,
        /// Sector id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
    },
    /// Change a sector's fields
    Update {
        sector_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a sector (its clients keep a dangling sector id)
    Delete { sector_id: String },
    /// Attach a catalog module with its schema defaults
    Assign { sector_id: String, module_id: String },
    /// Detach a module
    Unassign { sector_id: String, module_id: String },
    /// Flip a module between active and inactive
    Toggle { sector_id: String, module_id: String },
    /// Set a module's prompt
    Prompt {
        sector_id: String,
        module_id: String,
        prompt: String,
    },
    /// Set module config values
    Config {
        sector_id: String,
        module_id: String,
        /// Value to set as key=value (repeatable)
        #[arg(long = "set", value_parser = parse_config_pair, required = true)]
        values: Vec<(String, ConfigValue)>,
        /// Drop values not given with --set
        #[arg(long)]
        replace: bool,
    },
    /// Copy a sector module onto every client that still tracks it
    Propagate { sector_id: String, module_id: String },
}

/// Form checks for a new sector.
fn validate_new_sector(existing: &[Sector], sector: &Sector) -> kurasi_core::Result<()> {
    validate_all([
        validate_required(&sector.id, "Sector ID"),
        validate_required(&sector.name, "Sector name"),
        validate_required(&sector.category, "Category"),
        validate_required(&sector.description, "Description"),
        validate_no_duplicate(existing, |s| s.id.as_str(), &sector.id, "sector ID"),
        validate_no_duplicate(existing, |s| s.name.as_str(), &sector.name, "sector name"),
    ])
}

/// Form checks for a rename; the sector itself does not count as a duplicate.
fn validate_sector_name(existing: &[Sector], sector_id: &str, name: &str) -> kurasi_core::Result<()> {
    let others: Vec<Sector> = existing.iter().filter(|s| s.id != sector_id).cloned().collect();
    validate_all([
        validate_required(name, "Sector name"),
        validate_no_duplicate(&others, |s| s.name.as_str(), name, "sector name"),
    ])
}

pub fn run(console: &AdminConsole, action: SectorAction) -> Result<()> {
    let sectors = console.sectors();
    match action {
        SectorAction::List => {
            let all = sectors.sectors();
            if all.is_empty() {
                println!("No sectors");
            }
            for sector in all {
                println!("{}  {}  [{}]", sector.id, sector.name, sector.category);
                for (module_id, instance) in &sector.modules {
                    println!("{}", describe_instance(module_id, instance));
                }
            }
        }
        SectorAction::Show { sector_id } => {
            let Some(sector) = sectors.get_sector_by_id(&sector_id) else {
                bail!("Sector '{}' not found", sector_id);
            };
            println!("{}", serde_json::to_string_pretty(&sector)?);
        }
        SectorAction::Add {
            name,
            id,
            description,
            category,
        } => {
            let mut sector = Sector::new(
                id.unwrap_or_else(|| generated_id("sector")),
                name.trim(),
            )
            .with_category(category.trim());
            sector.description = description.trim().to_string();
            validate_new_sector(&sectors.sectors(), &sector)?;
            let id = sector.id.clone();
            sectors.add_sector(sector)?;
            println!("Added sector '{}'", id);
        }
        SectorAction::Update {
            sector_id,
            name,
            description,
            category,
        } => {
            if let Some(name) = &name {
                validate_sector_name(&sectors.sectors(), &sector_id, name)?;
            }
            if let Some(category) = &category {
                validate_required(category, "Category")?;
            }
            let patch = SectorPatch {
                name: name.map(|n| n.trim().to_string()),
                description,
                category: category.map(|c| c.trim().to_string()),
                modules: None,
            };
            ensure_applied(sectors.update_sector(&sector_id, patch)?, "Sector", &sector_id, None)?;
            println!("Updated sector '{}'", sector_id);
        }
        SectorAction::Delete { sector_id } => {
            ensure_applied(sectors.delete_sector(&sector_id)?, "Sector", &sector_id, None)?;
            println!("Deleted sector '{}'", sector_id);
        }
        SectorAction::Assign { sector_id, module_id } => {
            let outcome = sectors.assign_sector_module(&sector_id, &module_id)?;
            ensure_applied(outcome, "Sector", &sector_id, Some(module_id.as_str()))?;
            println!("Assigned '{}' to sector '{}'", module_id, sector_id);
        }
        SectorAction::Unassign { sector_id, module_id } => {
            let outcome = sectors.unassign_sector_module(&sector_id, &module_id)?;
            ensure_applied(outcome, "Sector", &sector_id, Some(module_id.as_str()))?;
            println!("Removed '{}' from sector '{}'", module_id, sector_id);
        }
        SectorAction::Toggle { sector_id, module_id } => {
            let outcome = sectors.toggle_sector_module_active(&sector_id, &module_id)?;
            ensure_applied(outcome, "Sector", &sector_id, Some(module_id.as_str()))?;
            if let Some(instance) = sectors.sector_module(&sector_id, &module_id) {
                println!("{}", describe_instance(&module_id, &instance).trim_start());
            }
        }
        SectorAction::Prompt {
            sector_id,
            module_id,
            prompt,
        } => {
            let outcome = sectors.update_sector_module_prompt(&sector_id, &module_id, &prompt)?;
            ensure_applied(outcome, "Sector", &sector_id, Some(module_id.as_str()))?;
            println!("Prompt updated");
        }
        SectorAction::Config {
            sector_id,
            module_id,
            values,
            replace,
        } => {
            let Some(current) = sectors.sector_module(&sector_id, &module_id) else {
                bail!("Module '{}' not available on Sector '{}'", module_id, sector_id);
            };
            let config = merged_config(&current, values, replace);
            let outcome = sectors.update_sector_module_config(&sector_id, &module_id, config)?;
            ensure_applied(outcome, "Sector", &sector_id, Some(module_id.as_str()))?;
            println!("Config updated");
        }
        SectorAction::Propagate { sector_id, module_id } => {
            if sectors.sector_module(&sector_id, &module_id).is_none() {
                bail!("Module '{}' not available on Sector '{}'", module_id, sector_id);
            }
            let updated = console.clients().propagate_sector_module(&sector_id, &module_id)?;
            println!("Updated {} tracking clients", updated);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(id: &str, name: &str, category: &str) -> Sector {
        let mut sector = Sector::new(id, name).with_category(category);
        sector.description = "desc".to_string();
        sector
    }

    fn existing() -> Vec<Sector> {
        vec![sector("s1", "Retail", "medsos")]
    }

    #[test]
    fn test_validate_new_sector() {
        assert_eq!(
            validate_new_sector(&existing(), &sector("s2", "retail", "medsos")).unwrap_err().to_string(),
            "Validation error: A sector name with this value already exists"
        );

        assert_eq!(
            validate_new_sector(&existing(), &sector("s2", "Banking", "")).unwrap_err().to_string(),
            "Validation error: Category is required"
        );

        let mut undescribed = sector("s2", "Banking", "medkon");
        undescribed.description.clear();
        assert_eq!(
            validate_new_sector(&existing(), &undescribed).unwrap_err().to_string(),
            "Validation error: Description is required"
        );

        assert!(validate_new_sector(&existing(), &sector("s2", "Banking", "medkon")).is_ok());
    }

    #[test]
    fn test_rename_ignores_own_name() {
        assert!(validate_sector_name(&existing(), "s1", "RETAIL").is_ok());
        assert!(validate_sector_name(&existing(), "s2", "Retail").is_err());
        assert!(validate_sector_name(&existing(), "s1", " ").is_err());
    }
}
