//! Versioned persistence DTOs.
//!
//! Every persisted record is a flat JSON (or TOML) object carrying a
//! `"version"` key; the migrators below turn it into domain types.

pub mod auth_state;
pub mod client_store;
pub mod console_config;
pub mod module_store;
pub mod sector_store;

pub use auth_state::{AUTH_STATE_ENTITY, AuthStateV1_0_0, create_auth_state_migrator};
pub use client_store::{CLIENT_STORE_ENTITY, ClientStoreV1_0_0, create_client_store_migrator};
pub use console_config::{
    CONSOLE_CONFIG_ENTITY, ConsoleConfigV1_0_0, create_console_config_migrator,
};
pub use module_store::{MODULE_STORE_ENTITY, ModuleStoreV1_0_0, create_module_store_migrator};
pub use sector_store::{SECTOR_STORE_ENTITY, SectorStoreV1_0_0, create_sector_store_migrator};
