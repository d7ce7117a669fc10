//! Remote blob store abstraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One record returned by the remote store. `data` holds an export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub data: Value,
}

/// A remote store holding exported console state.
///
/// Failures to reach the store, or non-success answers, are reported as
/// `KurasiError::Transport` so callers can tell them apart from bad payloads.
#[async_trait::async_trait]
pub trait RemoteBlobStore: Send + Sync {
    /// Uploads an export document (JSON text).
    async fn store(&self, blob: &str) -> Result<()>;

    /// Downloads the stored records, newest first as the store orders them.
    async fn retrieve(&self) -> Result<Vec<RemoteRecord>>;
}
