//! Sector domain module.
//!
//! A sector groups clients of one category and holds the "Level-1" module
//! configuration they inherit from.

mod model;

pub use model::{Sector, SectorPatch};
