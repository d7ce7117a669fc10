//! Core domain of the Kurasi admin console.
//!
//! Holds the entity models, the module inheritance engine, the registries and
//! the traits the infrastructure layer implements.

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod entity_module;
pub mod error;
pub mod module;
pub mod registry;
pub mod remote;
pub mod repository;
pub mod sector;
pub mod snapshot;
pub mod storage;
pub mod validation;

// Re-export common error type
pub use error::{KurasiError, Result};
