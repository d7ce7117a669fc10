//! End-to-end flows over a file-backed console.

use std::sync::Arc;

use async_trait::async_trait;
use kurasi_application::AdminConsole;
use kurasi_core::Result;
use kurasi_core::auth::SESSION_DURATION_MS;
use kurasi_core::client::Client;
use kurasi_core::clock::ManualClock;
use kurasi_core::config::AdminConfig;
use kurasi_core::module::{ConfigField, ConfigValue, MasterModule};
use kurasi_core::remote::{RemoteBlobStore, RemoteRecord};
use kurasi_core::sector::Sector;
use kurasi_core::storage::{KeyValueStore, keys};
use kurasi_infrastructure::FileKeyValueStore;
use serde_json::json;
use tempfile::TempDir;

struct OfflineStore;

#[async_trait]
impl RemoteBlobStore for OfflineStore {
    async fn store(&self, _blob: &str) -> Result<()> {
        Err(kurasi_core::KurasiError::transport("offline"))
    }

    async fn retrieve(&self) -> Result<Vec<RemoteRecord>> {
        Err(kurasi_core::KurasiError::transport("offline"))
    }
}

const T0: i64 = 1_700_000_000_000;

fn open(dir: &TempDir, clock: Arc<ManualClock>) -> AdminConsole {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(dir.path()));
    let admin = AdminConfig {
        password: Some("secret".to_string()),
        ..AdminConfig::default()
    };
    AdminConsole::with_parts(store, clock, Arc::new(OfflineStore), admin).unwrap()
}

fn seed(console: &AdminConsole) {
    console
        .modules()
        .add_module(
            MasterModule::new("m1", "Churn").with_field(ConfigField::new("a").with_default(0)),
        )
        .unwrap();
    console.sectors().add_sector(Sector::new("s1", "Retail")).unwrap();
    console.sectors().assign_sector_module("s1", "m1").unwrap();
    console.sectors().toggle_sector_module_active("s1", "m1").unwrap();
    console
        .sectors()
        .update_sector_module_prompt("s1", "m1", "p")
        .unwrap();
    console
        .clients()
        .add_client(Client::new("c1", "Acme").with_sector("s1"))
        .unwrap();
}

#[test]
fn state_survives_reopen_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let console = open(&dir, clock.clone());
    seed(&console);

    let inherited = console.clients().get_client_by_id("c1").unwrap().modules["m1"].clone();
    assert!(inherited.is_active);
    assert_eq!(inherited.prompt, "p");
    assert_eq!(inherited.config_values["a"], ConfigValue::from(0));

    let exported = console.operations().export_state().unwrap();
    drop(console);

    let reopened = open(&dir, clock);
    assert_eq!(reopened.operations().export_state().unwrap(), exported);

    reopened.operations().clear_state().unwrap();
    reopened.operations().import_state(&exported).unwrap();
    assert_eq!(reopened.operations().export_state().unwrap(), exported);
}

#[test]
fn cascade_delete_persists() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let console = open(&dir, clock.clone());
    seed(&console);

    console.operations().delete_module_cascade("m1").unwrap();
    drop(console);

    let reopened = open(&dir, clock);
    assert!(reopened.modules().modules().is_empty());
    assert!(reopened.sectors().sectors()[0].modules.is_empty());
    assert!(reopened.clients().clients()[0].modules.is_empty());
}

#[test]
fn legacy_blob_seeds_registries_once() {
    let dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(dir.path());
    let legacy = json!({
        "state": {
            "masterModules": [{"id": 1, "name": "Churn", "config_schema": [{"name": "a", "default": 2}]}],
            "sectors": [{"id": 10, "name": "Retail", "modules": {"1": {"is_active": true, "prompt": "", "config_values": {"a": 2}}}}],
            "clients": [{"id": 100, "name": "Acme", "project_id": "42", "sector_id": 10, "modules": {}}]
        },
        "version": 0
    });
    store.set(keys::LEGACY_SYSTEM, &legacy.to_string()).unwrap();

    let clock = Arc::new(ManualClock::new(T0));
    let console = open(&dir, clock.clone());

    let modules = console.modules().modules();
    assert_eq!(modules[0].id, "1");
    let sector = console.sectors().get_sector_by_id("10").unwrap();
    assert!(sector.modules.contains_key(&modules[0].id));
    let client = console.clients().get_client_by_id("100").unwrap();
    assert_eq!(client.project_id, 42);
    assert_eq!(client.sector_id.as_deref(), Some("10"));

    assert!(store.get(keys::LEGACY_SYSTEM_BACKUP).unwrap().is_some());
    assert!(store.get(keys::LEGACY_SYSTEM).unwrap().is_some());

    // The own records now win; edits are not overwritten by the legacy blob.
    console.modules().add_module(MasterModule::new("m2", "Upsell")).unwrap();
    assert!(console.operations().complete_legacy_migration().unwrap());
    drop(console);

    let reopened = open(&dir, clock);
    assert_eq!(reopened.modules().modules().len(), 2);
    assert!(store.get(keys::LEGACY_SYSTEM).unwrap().is_none());
    assert!(store.get(keys::LEGACY_SYSTEM_BACKUP).unwrap().is_some());
}

#[tokio::test]
async fn session_persists_until_expiry() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let console = open(&dir, clock.clone());

    assert!(!console.auth().check_auth().await.unwrap());
    assert!(console.auth().login("admin", "secret").await.unwrap());
    drop(console);

    clock.advance(SESSION_DURATION_MS - 1);
    let reopened = open(&dir, clock.clone());
    assert!(reopened.auth().check_auth().await.unwrap());
    assert!(reopened.auth().refresh_session_if_active().await.unwrap());

    clock.advance(SESSION_DURATION_MS + 1);
    assert!(!reopened.auth().check_auth().await.unwrap());
}

#[tokio::test]
async fn offline_remote_leaves_state_untouched() {
    let dir = TempDir::new().unwrap();
    let console = open(&dir, Arc::new(ManualClock::new(T0)));
    seed(&console);
    let before = console.operations().export_state().unwrap();

    assert!(console.remote().push().await.unwrap_err().is_transport());
    assert!(console.remote().pull().await.unwrap_err().is_transport());
    assert_eq!(console.operations().export_state().unwrap(), before);
}
