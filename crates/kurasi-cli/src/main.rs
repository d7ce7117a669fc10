use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kurasi_application::AdminConsole;
use kurasi_core::config::{ConsoleConfig, DEFAULT_ADMIN_USERNAME};
use kurasi_infrastructure::ConfigService;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::auth::DarkModeArg;
use commands::client::ClientAction;
use commands::module::ModuleAction;
use commands::sector::SectorAction;

const LOG_ENV: &str = "KURASI_LOG";

#[derive(Parser)]
#[command(name = "kurasi")]
#[command(about = "Kurasi - admin console for modular analytics configuration", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding persisted state (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in as the admin
    Login {
        #[arg(long, default_value = DEFAULT_ADMIN_USERNAME)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show session and preference state
    Status,
    /// Print a password hash usable as `admin.password_hash`
    HashPassword { password: String },
    /// Write the full state as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace state from an export document
    Import { file: PathBuf },
    /// Remove all modules, sectors and clients
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
    /// Delete a master module and every reference to it
    DeleteModule { module_id: String },
    /// Remove the first-generation state blob (its backup stays)
    CompleteMigration,
    /// Upload the current state to the remote store
    Push,
    /// Replace the current state with the remote copy
    Pull,
    /// Show or change the dark-mode preference
    DarkMode {
        #[arg(value_enum)]
        mode: Option<DarkModeArg>,
    },
    /// Manage the master module catalog
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },
    /// Manage sectors and their module defaults
    Sector {
        #[command(subcommand)]
        action: SectorAction,
    },
    /// Manage clients and their module overrides
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
}

impl Commands {
    /// Commands that need a live session.
    fn is_protected(&self) -> bool {
        !matches!(
            self,
            Commands::Login { .. } | Commands::Logout | Commands::Status | Commands::HashPassword { .. }
        )
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let service = ConfigService::new(cli.config.clone()).context("Failed to locate config file")?;
    let mut config = service
        .load_with_env()
        .with_context(|| format!("Failed to load config from {}", service.path().display()))?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::HashPassword { password } = &cli.command {
        return commands::auth::hash_password(password).await;
    }

    let config = load_config(&cli)?;
    let console = AdminConsole::open(&config)?;
    if cli.command.is_protected() {
        commands::require_session(&console).await?;
    }

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&console, &username, &password).await
        }
        Commands::Logout => commands::auth::logout(&console).await,
        Commands::Status => commands::auth::status(&console, &config).await,
        Commands::HashPassword { password } => commands::auth::hash_password(&password).await,
        Commands::Export { output } => commands::data::export(&console, output.as_deref()),
        Commands::Import { file } => commands::data::import(&console, &file),
        Commands::Clear { yes } => commands::data::clear(&console, yes),
        Commands::DeleteModule { module_id } => commands::data::delete_module(&console, &module_id),
        Commands::CompleteMigration => commands::data::complete_migration(&console),
        Commands::Push => commands::sync::push(&console).await,
        Commands::Pull => commands::sync::pull(&console).await,
        Commands::DarkMode { mode } => commands::auth::dark_mode(&console, mode).await,
        Commands::Module { action } => commands::module::run(&console, action),
        Commands::Sector { action } => commands::sector::run(&console, action),
        Commands::Client { action } => commands::client::run(&console, action),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_protected_commands() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        assert!(parse(&["kurasi", "push"]).is_protected());
        assert!(parse(&["kurasi", "clear", "--yes"]).is_protected());
        assert!(parse(&["kurasi", "dark-mode", "toggle"]).is_protected());
        assert!(!parse(&["kurasi", "login", "--password", "pw"]).is_protected());
        assert!(!parse(&["kurasi", "status"]).is_protected());
        assert!(!parse(&["kurasi", "hash-password", "pw"]).is_protected());
    }

    #[test]
    fn test_catalog_commands_parse() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        let cmd = parse(&[
            "kurasi", "module", "add", "--name", "Churn", "--metric", "rate", "--metric", "volume",
            "--schema", r#"[{"name":"a"}]"#,
        ]);
        assert!(cmd.is_protected());
        match cmd {
            Commands::Module {
                action: ModuleAction::Add { name, metrics, id, schema, .. },
            } => {
                assert_eq!(name, "Churn");
                assert_eq!(metrics, vec!["rate", "volume"]);
                assert_eq!(id, None);
                assert!(schema.is_some());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(matches!(
            parse(&["kurasi", "module", "update", "m1", "--tab", "insights"]),
            Commands::Module { action: ModuleAction::Update { metrics: None, .. } }
        ));
        assert!(matches!(parse(&["kurasi", "module", "list"]), Commands::Module { .. }));
    }

    #[test]
    fn test_sector_commands_parse() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        assert!(matches!(
            parse(&["kurasi", "sector", "add", "--name", "Retail", "--category", "medsos", "--description", "d"]),
            Commands::Sector { action: SectorAction::Add { id: None, .. } }
        ));
        assert!(matches!(
            parse(&["kurasi", "sector", "assign", "s1", "m1"]),
            Commands::Sector { action: SectorAction::Assign { .. } }
        ));
        assert!(matches!(
            parse(&["kurasi", "sector", "prompt", "s1", "m1", "Summarize weekly"]),
            Commands::Sector { action: SectorAction::Prompt { .. } }
        ));
        assert!(matches!(
            parse(&["kurasi", "sector", "propagate", "s1", "m1"]),
            Commands::Sector { action: SectorAction::Propagate { .. } }
        ));

        match parse(&["kurasi", "sector", "config", "s1", "m1", "--set", "a=1", "--set", "b=x", "--replace"]) {
            Commands::Sector {
                action: SectorAction::Config { values, replace, .. },
            } => {
                assert_eq!(values.len(), 2);
                assert!(replace);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        // Config needs at least one value; a malformed pair is rejected at parse time.
        assert!(Cli::try_parse_from(["kurasi", "sector", "config", "s1", "m1"]).is_err());
        assert!(Cli::try_parse_from(["kurasi", "sector", "config", "s1", "m1", "--set", "oops"]).is_err());
    }

    #[test]
    fn test_client_commands_parse() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        match parse(&["kurasi", "client", "add", "--name", "Acme", "--project-id", "42", "--sector", "s1"]) {
            Commands::Client {
                action: ClientAction::Add { project_id, sector, .. },
            } => {
                assert_eq!(project_id, 42);
                assert_eq!(sector.as_deref(), Some("s1"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        match parse(&["kurasi", "client", "config", "c1", "m1", "--set", "a=2", "--override"]) {
            Commands::Client {
                action: ClientAction::Config { mark_override, track, .. },
            } => {
                assert!(mark_override);
                assert!(!track);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(matches!(
            parse(&["kurasi", "client", "resync", "c1", "m1"]),
            Commands::Client { action: ClientAction::Resync { .. } }
        ));
        assert!(matches!(
            parse(&["kurasi", "client", "update", "c1", "--no-sector"]),
            Commands::Client { action: ClientAction::Update { no_sector: true, sector: None, .. } }
        ));

        assert!(Cli::try_parse_from(["kurasi", "client", "update", "c1", "--sector", "s1", "--no-sector"]).is_err());
        assert!(Cli::try_parse_from(["kurasi", "client", "config", "c1", "m1", "--set", "a=1", "--override", "--track"]).is_err());
        assert!(Cli::try_parse_from(["kurasi", "client", "add", "--name", "Acme"]).is_err());
    }

    #[test]
    fn test_global_paths() {
        let cli = Cli::try_parse_from(["kurasi", "export", "--data-dir", "/tmp/k", "-o", "out.json"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/k")));
        assert!(matches!(cli.command, Commands::Export { output: Some(_) }));
    }
}
