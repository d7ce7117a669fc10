use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use kurasi_application::AdminConsole;

pub fn export(console: &AdminConsole, output: Option<&Path>) -> Result<()> {
    let json = console.operations().export_state()?;
    match output {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported state to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn import(console: &AdminConsole, file: &Path) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = console
        .operations()
        .import_state(&json)
        .with_context(|| format!("Import of {} rejected", file.display()))?;

    let describe = |count: Option<usize>| match count {
        Some(n) => n.to_string(),
        None => "unchanged".to_string(),
    };
    println!("Modules: {}", describe(report.modules));
    println!("Sectors: {}", describe(report.sectors));
    println!("Clients: {}", describe(report.clients));
    Ok(())
}

pub fn clear(console: &AdminConsole, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Refusing to clear all data without --yes");
    }
    console.operations().clear_state()?;
    println!("All modules, sectors and clients removed");
    Ok(())
}

pub fn delete_module(console: &AdminConsole, module_id: &str) -> Result<()> {
    let report = console.operations().delete_module_cascade(module_id)?;
    if !report.removed_from_catalog {
        println!("Module '{}' was not in the catalog", module_id);
    }
    println!(
        "Removed '{}' from {} sectors and {} clients",
        module_id, report.sectors_updated, report.clients_updated
    );
    Ok(())
}

pub fn complete_migration(console: &AdminConsole) -> Result<()> {
    if console.operations().complete_legacy_migration()? {
        println!("Legacy state removed; backup kept");
    } else {
        println!("No legacy state present");
    }
    Ok(())
}
