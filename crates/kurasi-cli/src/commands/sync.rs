use anyhow::{Context, Result};
use kurasi_application::{AdminConsole, PullOutcome};

pub async fn push(console: &AdminConsole) -> Result<()> {
    console
        .remote()
        .push()
        .await
        .context("Failed to push state")?;
    println!("State pushed");
    Ok(())
}

pub async fn pull(console: &AdminConsole) -> Result<()> {
    let outcome = console
        .remote()
        .pull()
        .await
        .context("Failed to pull state")?;
    match outcome {
        PullOutcome::Applied(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        PullOutcome::Empty => println!("Remote store is empty; nothing changed"),
        PullOutcome::Stale => println!("A newer pull was already applied; response discarded"),
    }
    Ok(())
}
