use anyhow::{Result, bail};
use chrono::DateTime;
use clap::ValueEnum;
use kurasi_application::AdminConsole;
use kurasi_core::auth::password::hash_password_blocking;
use kurasi_core::config::ConsoleConfig;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DarkModeArg {
    On,
    Off,
    Toggle,
}

fn format_ms(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

pub async fn login(console: &AdminConsole, username: &str, password: &str) -> Result<()> {
    if !console.auth().login(username, password).await? {
        bail!("Invalid username or password");
    }
    println!("Logged in as {}", username);
    Ok(())
}

pub async fn logout(console: &AdminConsole) -> Result<()> {
    console.auth().logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn status(console: &AdminConsole, config: &ConsoleConfig) -> Result<()> {
    let auth = console.auth();
    if auth.check_auth().await? {
        if let Some(session) = auth.session().await {
            println!("Logged in:  {}", session.username);
            println!("Expires at: {}", format_ms(session.expires_at));
        }
    } else {
        println!("Logged in:  no");
    }
    println!("Dark mode:  {}", if auth.dark_mode().await { "on" } else { "off" });
    println!("Data dir:   {}", AdminConsole::resolve_data_dir(config)?.display());
    println!("Remote:     {}", config.remote.base_url);
    Ok(())
}

pub async fn hash_password(password: &str) -> Result<()> {
    let hash = hash_password_blocking(password.to_string()).await?;
    println!("{}", hash);
    Ok(())
}

pub async fn dark_mode(console: &AdminConsole, mode: Option<DarkModeArg>) -> Result<()> {
    let auth = console.auth();
    let enabled = match mode {
        None => auth.dark_mode().await,
        Some(DarkModeArg::Toggle) => auth.toggle_dark_mode().await?,
        Some(DarkModeArg::On) => {
            auth.set_dark_mode(true).await?;
            true
        }
        Some(DarkModeArg::Off) => {
            auth.set_dark_mode(false).await?;
            false
        }
    };
    println!("Dark mode: {}", if enabled { "on" } else { "off" });
    Ok(())
}
