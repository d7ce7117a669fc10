use anyhow::{Context, Result, bail};
use clap::Subcommand;
use kurasi_application::AdminConsole;
use kurasi_core::module::{ConfigField, MasterModule, ModulePatch};
use kurasi_core::validation::{validate_all, validate_no_duplicate, validate_required};

use super::{ensure_applied, generated_id};

#[derive(Subcommand, Debug)]
pub enum ModuleAction {
    /// List catalog modules
    List,
    /// Print one module as JSON
    Show { module_id: String },
    /// Add a module to the catalog
    Add {
        #[arg(long)]
        name: String,
        /// Module id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "")]
        query_name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        tab: String,
        /// Metric name (repeatable)
        #[arg(long = "metric")]
        metrics: Vec<String>,
        /// Config schema as a JSON array, e.g. '[{"name":"threshold","default":3}]'
        #[arg(long)]
        schema: Option<String>,
    },
    /// Change catalog fields of a module
    Update {
        module_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        query_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        tab: Option<String>,
        /// Replaces all metrics (repeatable)
        #[arg(long = "metric")]
        metrics: Option<Vec<String>>,
        /// Replaces the config schema (JSON array)
        #[arg(long)]
        schema: Option<String>,
    },
}

fn parse_schema(raw: &str) -> Result<Vec<ConfigField>> {
    serde_json::from_str(raw).context("Config schema must be a JSON array of fields")
}

/// Form checks for a new catalog entry.
fn validate_new_module(existing: &[MasterModule], module: &MasterModule) -> kurasi_core::Result<()> {
    validate_all([
        validate_required(&module.id, "Module ID"),
        validate_required(&module.name, "Module name"),
        validate_no_duplicate(existing, |m| m.id.as_str(), &module.id, "module ID"),
    ])
}

pub fn run(console: &AdminConsole, action: ModuleAction) -> Result<()> {
    let registry = console.modules();
    match action {
        ModuleAction::List => {
            let modules = registry.modules();
            if modules.is_empty() {
                println!("No modules in the catalog");
            }
            for module in modules {
                println!(
                    "{}  {}  ({} config fields)",
                    module.id,
                    module.name,
                    module.config_schema.len()
                );
            }
        }
        ModuleAction::Show { module_id } => {
            let Some(module) = registry.get_module_by_id(&module_id) else {
                bail!("Module '{}' not found", module_id);
            };
            println!("{}", serde_json::to_string_pretty(&module)?);
        }
        ModuleAction::Add {
            name,
            id,
            query_name,
            description,
            tab,
            metrics,
            schema,
        } => {
            let module = MasterModule {
                id: id.unwrap_or_else(|| generated_id("module")),
                name: name.trim().to_string(),
                query_name,
                description,
                tab,
                metrics,
                config_schema: schema.as_deref().map(parse_schema).transpose()?.unwrap_or_default(),
            };
            validate_new_module(&registry.modules(), &module)?;
            let id = module.id.clone();
            registry.add_module(module)?;
            println!("Added module '{}'", id);
        }
        ModuleAction::Update {
            module_id,
            name,
            query_name,
            description,
            tab,
            metrics,
            schema,
        } => {
            if let Some(name) = &name {
                validate_required(name, "Module name")?;
            }
            let patch = ModulePatch {
                name: name.map(|n| n.trim().to_string()),
                query_name,
                description,
                tab,
                metrics,
                config_schema: schema.as_deref().map(parse_schema).transpose()?,
            };
            ensure_applied(registry.update_module(&module_id, patch)?, "Module", &module_id, None)?;
            println!("Updated module '{}'", module_id);
        }
    }
    Ok(())
}
