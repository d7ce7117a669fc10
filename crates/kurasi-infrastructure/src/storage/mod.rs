//! Key-value storage backends.
//!
//! - `memory`: volatile store for tests and ephemeral runs
//! - `file_store`: one `<key>.json` file per key with atomic writes
//! - `atomic`: tmp-file + fsync + rename writes under an exclusive lock

pub mod atomic;
pub mod file_store;
pub mod memory;

pub use file_store::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
