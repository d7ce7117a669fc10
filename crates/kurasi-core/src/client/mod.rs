//! Client domain module.

mod model;

pub use model::{Client, ClientPatch};
