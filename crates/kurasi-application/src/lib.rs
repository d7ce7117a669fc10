//! Application layer for Kurasi.
//!
//! Use cases that coordinate the registries with persistence, the auth record
//! and the remote blob store.

pub mod auth_service;
pub mod console;
pub mod data_operations;
pub mod remote_sync;

pub use auth_service::AuthService;
pub use console::AdminConsole;
pub use data_operations::{CascadeReport, DataOperations, ImportReport};
pub use remote_sync::{PullOutcome, RemoteSync};
