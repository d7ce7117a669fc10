use anyhow::{Result, bail};
use clap::Subcommand;
use kurasi_application::AdminConsole;
use kurasi_core::KurasiError;
use kurasi_core::client::{Client, ClientPatch};
use kurasi_core::entity_module::OpOutcome;
use kurasi_core::module::ConfigValue;
use kurasi_core::sector::Sector;
use kurasi_core::validation::{
    validate_all, validate_no_duplicate, validate_positive_number, validate_required,
};

use super::{describe_instance, ensure_applied, generated_id, merged_config, parse_config_pair};

#[derive(Subcommand, Debug)]
pub enum ClientAction {
    /// List clients and their modules
    List,
    /// Print one client as JSON
    Show { client_id: String },
    /// Create a client; a sector with modules seeds its module map
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        project_id: i64,
        /// Client id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },
    /// Change a client's fields
    Update {
        client_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        project_id: Option<i64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "no_sector")]
        sector: Option<String>,
        /// Detach the client from its sector
        #[arg(long)]
        no_sector: bool,
        #[arg(long)]
        logo: Option<String>,
    },
    /// Delete a client
    Delete { client_id: String },
    /// Attach a catalog module, inheriting the sector's instance when present
    Assign { client_id: String, module_id: String },
    /// Detach a module
    Unassign { client_id: String, module_id: String },
    /// Flip a module between active and inactive (marks it as an override)
    Toggle { client_id: String, module_id: String },
    /// Set a module's prompt (marks it as an override)
    Prompt {
        client_id: String,
        module_id: String,
        prompt: String,
    },
    /// Set module config values
    Config {
        client_id: String,
        module_id: String,
        /// Value to set as key=value (repeatable)
        #[arg(long = "set", value_parser = parse_config_pair, required = true)]
        values: Vec<(String, ConfigValue)>,
        /// Drop values not given with --set
        #[arg(long)]
        replace: bool,
        /// Mark the instance as an override
        #[arg(long = "override", conflicts_with = "track")]
        mark_override: bool,
        /// Mark the instance as tracking its sector
        #[arg(long)]
        track: bool,
    },
    /// Re-copy a tracking module from the client's sector
    Resync { client_id: String, module_id: String },
}

/// Form checks for a new client.
fn validate_new_client(existing: &[Client], sectors: &[Sector], client: &Client) -> kurasi_core::Result<()> {
    validate_all([
        validate_required(&client.client_id, "Client ID"),
        validate_required(&client.name, "Client name"),
        validate_positive_number(client.project_id as f64, "Project ID"),
        validate_no_duplicate(existing, |c| c.client_id.as_str(), &client.client_id, "client ID"),
        validate_no_duplicate(existing, |c| c.name.as_str(), &client.name, "client name"),
        validate_sector_exists(sectors, client.sector_id.as_deref()),
    ])
}

fn validate_sector_exists(sectors: &[Sector], sector_id: Option<&str>) -> kurasi_core::Result<()> {
    match sector_id {
        Some(id) if !sectors.iter().any(|s| s.id == id) => {
            Err(KurasiError::validation(format!("Sector '{}' does not exist", id)))
        }
        _ => Ok(()),
    }
}

fn override_flag(mark_override: bool, track: bool) -> Option<bool> {
    match (mark_override, track) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub fn run(console: &AdminConsole, action: ClientAction) -> Result<()> {
    let clients = console.clients();
    match action {
        ClientAction::List => {
            let all = clients.clients();
            if all.is_empty() {
                println!("No clients");
            }
            for client in all {
                println!(
                    "{}  {}  project {}  sector {}",
                    client.client_id,
                    client.name,
                    client.project_id,
                    client.sector_id.as_deref().unwrap_or("-")
                );
                for (module_id, instance) in &client.modules {
                    println!("{}", describe_instance(module_id, instance));
                }
            }
        }
        ClientAction::Show { client_id } => {
            let Some(client) = clients.get_client_by_id(&client_id) else {
                bail!("Client '{}' not found", client_id);
            };
            println!("{}", serde_json::to_string_pretty(&client)?);
        }
        ClientAction::Add {
            name,
            project_id,
            id,
            category,
            sector,
            logo,
        } => {
            let mut client = Client::new(id.unwrap_or_else(|| generated_id("client")), name.trim())
                .with_project_id(project_id);
            client.category = category;
            client.sector_id = sector.filter(|s| !s.is_empty());
            client.logo = logo;
            validate_new_client(&clients.clients(), &console.sectors().sectors(), &client)?;
            let id = client.client_id.clone();
            clients.add_client(client)?;
            let inherited = clients.get_client_by_id(&id).map(|c| c.modules.len()).unwrap_or(0);
            println!("Added client '{}' with {} inherited modules", id, inherited);
        }
        ClientAction::Update {
            client_id,
            name,
            project_id,
            category,
            sector,
            no_sector,
            logo,
        } => {
            if let Some(name) = &name {
                validate_required(name, "Client name")?;
            }
            if let Some(project_id) = project_id {
                validate_positive_number(project_id as f64, "Project ID")?;
            }
            validate_sector_exists(&console.sectors().sectors(), sector.as_deref())?;
            let sector_id = match (sector, no_sector) {
                (_, true) => Some(None),
                (Some(id), false) => Some(Some(id)),
                (None, false) => None,
            };
            let patch = ClientPatch {
                name: name.map(|n| n.trim().to_string()),
                project_id,
                category,
                sector_id,
                logo: logo.map(Some),
                modules: None,
            };
            ensure_applied(clients.update_client(&client_id, patch)?, "Client", &client_id, None)?;
            println!("Updated client '{}'", client_id);
        }
        ClientAction::Delete { client_id } => {
            ensure_applied(clients.delete_client(&client_id)?, "Client", &client_id, None)?;
            println!("Deleted client '{}'", client_id);
        }
        ClientAction::Assign { client_id, module_id } => {
            let outcome = clients.assign_client_module(&client_id, &module_id)?;
            ensure_applied(outcome, "Client", &client_id, Some(module_id.as_str()))?;
            println!("Assigned '{}' to client '{}'", module_id, client_id);
        }
        ClientAction::Unassign { client_id, module_id } => {
            let outcome = clients.unassign_client_module(&client_id, &module_id)?;
            ensure_applied(outcome, "Client", &client_id, Some(module_id.as_str()))?;
            println!("Removed '{}' from client '{}'", module_id, client_id);
        }
        ClientAction::Toggle { client_id, module_id } => {
            let outcome = clients.toggle_client_module_active(&client_id, &module_id)?;
            ensure_applied(outcome, "Client", &client_id, Some(module_id.as_str()))?;
            if let Some(instance) = clients
                .get_client_by_id(&client_id)
                .and_then(|c| c.modules.get(&module_id).cloned())
            {
                println!("{}", describe_instance(&module_id, &instance).trim_start());
            }
        }
        ClientAction::Prompt {
            client_id,
            module_id,
            prompt,
        } => {
            let outcome = clients.update_client_module_prompt(&client_id, &module_id, &prompt)?;
            ensure_applied(outcome, "Client", &client_id, Some(module_id.as_str()))?;
            println!("Prompt updated");
        }
        ClientAction::Config {
            client_id,
            module_id,
            values,
            replace,
            mark_override,
            track,
        } => {
            let Some(client) = clients.get_client_by_id(&client_id) else {
                bail!("Client '{}' not found", client_id);
            };
            let Some(current) = client.modules.get(&module_id) else {
                bail!("Module '{}' not available on Client '{}'", module_id, client_id);
            };
            let config = merged_config(current, values, replace);
            let outcome = clients.update_client_module_config(
                &client_id,
                &module_id,
                config,
                override_flag(mark_override, track),
            )?;
            ensure_applied(outcome, "Client", &client_id, Some(module_id.as_str()))?;
            println!("Config updated");
        }
        ClientAction::Resync { client_id, module_id } => {
            let outcome = clients.resync_client_module(&client_id, &module_id)?;
            if outcome == OpOutcome::ModuleNotFound {
                bail!(
                    "Module '{}' on client '{}' is an override, unassigned, or missing from its sector",
                    module_id,
                    client_id
                );
            }
            ensure_applied(outcome, "Client", &client_id, Some(module_id.as_str()))?;
            println!("Resynced '{}' from sector", module_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sectors() -> Vec<Sector> {
        vec![Sector::new("s1", "Retail")]
    }

    #[test]
    fn test_validate_new_client() {
        let existing = vec![Client::new("c1", "Acme").with_project_id(1)];

        let zero_project = Client::new("c2", "Globex");
        assert_eq!(
            validate_new_client(&existing, &sectors(), &zero_project).unwrap_err().to_string(),
            "Validation error: Project ID must be a positive number"
        );

        let duplicate = Client::new("c2", "ACME").with_project_id(2);
        assert_eq!(
            validate_new_client(&existing, &sectors(), &duplicate).unwrap_err().to_string(),
            "Validation error: A client name with this value already exists"
        );

        let unknown_sector = Client::new("c2", "Globex").with_project_id(2).with_sector("s9");
        assert_eq!(
            validate_new_client(&existing, &sectors(), &unknown_sector).unwrap_err().to_string(),
            "Validation error: Sector 's9' does not exist"
        );

        let ok = Client::new("c2", "Globex").with_project_id(2).with_sector("s1");
        assert!(validate_new_client(&existing, &sectors(), &ok).is_ok());
    }

    #[test]
    fn test_commands_drive_inheritance() {
        use crate::commands::module::{self, ModuleAction};
        use crate::commands::sector::{self, SectorAction};
        use crate::commands::test_support;

        let console = test_support::console();
        module::run(
            &console,
            ModuleAction::Add {
                name: "Churn".to_string(),
                id: Some("m1".to_string()),
                query_name: String::new(),
                description: String::new(),
                tab: String::new(),
                metrics: Vec::new(),
                schema: Some(r#"[{"name": "a", "default": 1}, {"name": "b"}]"#.to_string()),
            },
        )
        .unwrap();
        sector::run(
            &console,
            SectorAction::Add {
                name: "Retail".to_string(),
                id: Some("s1".to_string()),
                description: "Shops".to_string(),
                category: "medsos".to_string(),
            },
        )
        .unwrap();
        sector::run(&console, SectorAction::Assign { sector_id: "s1".into(), module_id: "m1".into() }).unwrap();
        sector::run(
            &console,
            SectorAction::Config {
                sector_id: "s1".into(),
                module_id: "m1".into(),
                values: vec![("a".to_string(), ConfigValue::from(5))],
                replace: false,
            },
        )
        .unwrap();

        run(
            &console,
            ClientAction::Add {
                name: "Acme".to_string(),
                project_id: 42,
                id: Some("c1".to_string()),
                category: String::new(),
                sector: Some("s1".to_string()),
                logo: None,
            },
        )
        .unwrap();
        let inherited = console.clients().get_client_by_id("c1").unwrap().modules["m1"].clone();
        assert_eq!(inherited.config_values["a"], ConfigValue::from(5));
        assert_eq!(inherited.config_values["b"], ConfigValue::empty());

        // A duplicate name is rejected before touching the registry.
        let duplicate = ClientAction::Add {
            name: "ACME".to_string(),
            project_id: 7,
            id: None,
            category: String::new(),
            sector: None,
            logo: None,
        };
        assert!(run(&console, duplicate).is_err());
        assert_eq!(console.clients().clients().len(), 1);

        // Prompt edits diverge; resync then refuses to overwrite the override.
        run(
            &console,
            ClientAction::Prompt {
                client_id: "c1".into(),
                module_id: "m1".into(),
                prompt: "mine".into(),
            },
        )
        .unwrap();
        assert!(run(&console, ClientAction::Resync { client_id: "c1".into(), module_id: "m1".into() }).is_err());

        run(
            &console,
            ClientAction::Config {
                client_id: "c1".into(),
                module_id: "m1".into(),
                values: vec![("a".to_string(), ConfigValue::from(5))],
                replace: false,
                mark_override: false,
                track: true,
            },
        )
        .unwrap();
        sector::run(
            &console,
            SectorAction::Prompt {
                sector_id: "s1".into(),
                module_id: "m1".into(),
                prompt: "sector prompt".into(),
            },
        )
        .unwrap();
        sector::run(&console, SectorAction::Propagate { sector_id: "s1".into(), module_id: "m1".into() }).unwrap();
        let tracked = console.clients().get_client_by_id("c1").unwrap().modules["m1"].clone();
        assert_eq!(tracked.prompt, "sector prompt");
        assert_eq!(tracked.is_override, Some(false));

        assert!(sector::run(&console, SectorAction::Assign { sector_id: "s1".into(), module_id: "ghost".into() }).is_err());
    }

    #[test]
    fn test_override_flag() {
        assert_eq!(override_flag(true, false), Some(true));
        assert_eq!(override_flag(false, true), Some(false));
        assert_eq!(override_flag(false, false), None);
    }
}
