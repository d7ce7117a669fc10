pub mod auth_repository;
pub mod config_service;
pub mod dto;
pub mod entity_repository;
pub mod http_blob_store;
pub mod legacy;
pub mod paths;
pub mod storage;

pub use crate::auth_repository::KeyValueAuthRepository;
pub use crate::config_service::ConfigService;
pub use crate::entity_repository::{KeyValueEntityRepository, StoredEntity};
pub use crate::http_blob_store::HttpBlobStore;
pub use crate::legacy::LegacyBridge;
pub use crate::paths::KurasiPaths;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
