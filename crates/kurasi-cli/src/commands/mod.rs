pub mod auth;
pub mod client;
pub mod data;
pub mod module;
pub mod sector;
pub mod sync;

use anyhow::{Result, bail};
use kurasi_application::AdminConsole;
use kurasi_core::clock::{Clock, SystemClock};
use kurasi_core::entity_module::OpOutcome;
use kurasi_core::module::{ConfigValue, ConfigValues, ModuleInstance};
use serde_json::Number;

/// Gate for protected commands: validates the session, then extends it.
pub async fn require_session(console: &AdminConsole) -> Result<()> {
    if !console.auth().check_auth().await? {
        bail!("Not logged in. Run `kurasi login --password <password>` first.");
    }
    console.auth().refresh_session_if_active().await?;
    Ok(())
}

/// Turns a lookup miss into an error naming what did not resolve.
pub fn ensure_applied(outcome: OpOutcome, kind: &str, id: &str, module_id: Option<&str>) -> Result<()> {
    match (outcome, module_id) {
        (OpOutcome::Applied, _) => Ok(()),
        (OpOutcome::EntityNotFound, _) => bail!("{} '{}' not found", kind, id),
        (OpOutcome::ModuleNotFound, Some(module_id)) => {
            bail!("Module '{}' not available on {} '{}'", module_id, kind, id)
        }
        (OpOutcome::ModuleNotFound, None) => bail!("Module not found on {} '{}'", kind, id),
    }
}

/// Id for a new entity when none is given, e.g. `sector_1700000000000`.
pub fn generated_id(prefix: &str) -> String {
    format!("{}_{}", prefix, SystemClock.now_ms())
}

/// Parses a `key=value` pair. Booleans and numbers are typed, anything else is text.
pub fn parse_config_pair(raw: &str) -> std::result::Result<(String, ConfigValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {:?}", raw));
    }

    let value = match value {
        "true" => ConfigValue::Bool(true),
        "false" => ConfigValue::Bool(false),
        other => match other.parse::<i64>() {
            Ok(n) => ConfigValue::from(n),
            Err(_) => other
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(ConfigValue::Number)
                .unwrap_or_else(|| ConfigValue::from(other)),
        },
    };
    Ok((key.to_string(), value))
}

/// Overlays `pairs` on the instance's current values, or on nothing with `replace`.
pub fn merged_config(current: &ModuleInstance, pairs: Vec<(String, ConfigValue)>, replace: bool) -> ConfigValues {
    let mut values = if replace {
        ConfigValues::new()
    } else {
        current.config_values.clone()
    };
    values.extend(pairs);
    values
}

/// One-line summary of a module instance for listings.
pub fn describe_instance(module_id: &str, instance: &ModuleInstance) -> String {
    let state = if instance.is_active { "active" } else { "inactive" };
    let flag = match instance.is_override {
        Some(true) => " (override)",
        Some(false) => " (tracking)",
        None => "",
    };
    format!("  {} [{}]{}", module_id, state, flag)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use kurasi_application::AdminConsole;
    use kurasi_core::clock::ManualClock;
    use kurasi_core::config::AdminConfig;
    use kurasi_core::remote::{RemoteBlobStore, RemoteRecord};
    use kurasi_core::{KurasiError, Result};
    use kurasi_infrastructure::MemoryKeyValueStore;

    struct NoRemote;

    #[async_trait]
    impl RemoteBlobStore for NoRemote {
        async fn store(&self, _blob: &str) -> Result<()> {
            Err(KurasiError::transport("no remote in tests"))
        }

        async fn retrieve(&self) -> Result<Vec<RemoteRecord>> {
            Err(KurasiError::transport("no remote in tests"))
        }
    }

    /// A console over an in-memory store.
    pub fn console() -> AdminConsole {
        AdminConsole::with_parts(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(ManualClock::new(1_700_000_000_000)),
            Arc::new(NoRemote),
            AdminConfig::default(),
        )
        .unwrap()
    }
}
