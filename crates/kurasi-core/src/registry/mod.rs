//! Registries owning the three entity lists.
//!
//! # Module Structure
//!
//! - `module_registry`: master module catalog
//! - `sector_registry`: sectors; depends on the catalog
//! - `client_registry`: clients; depends on the catalog and on sectors
//!
//! Each registry is an `Arc`-shareable service. Mutations are synchronous and
//! persist through an `EntityRepository` before they become visible.

mod client_registry;
mod collection;
mod module_registry;
mod sector_registry;

pub use client_registry::ClientRegistry;
pub use module_registry::ModuleRegistry;
pub use sector_registry::SectorRegistry;
