//! Push/pull of the whole console state against a remote blob store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use kurasi_core::Result;
use kurasi_core::remote::RemoteBlobStore;

use crate::data_operations::{DataOperations, ImportReport};

/// Result of a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// The first remote record was imported.
    Applied(ImportReport),
    /// The store holds no records; nothing changed.
    Empty,
    /// A newer pull was applied while this one was in flight; discarded.
    Stale,
}

pub struct RemoteSync {
    store: Arc<dyn RemoteBlobStore>,
    operations: Arc<DataOperations>,
    next_ticket: AtomicU64,
    /// Ticket of the most recently applied pull.
    latest_applied: Mutex<u64>,
}

impl RemoteSync {
    pub fn new(store: Arc<dyn RemoteBlobStore>, operations: Arc<DataOperations>) -> Self {
        Self {
            store,
            operations,
            next_ticket: AtomicU64::new(0),
            latest_applied: Mutex::new(0),
        }
    }

    /// Uploads the current export document.
    pub async fn push(&self) -> Result<()> {
        let blob = self.operations.export_state()?;
        self.store.store(&blob).await?;
        tracing::info!("Pushed console state ({} bytes)", blob.len());
        Ok(())
    }

    /// Downloads the remote state and imports its first record.
    ///
    /// Transport failures, an empty record list and invalid documents leave
    /// every registry untouched.
    pub async fn pull(&self) -> Result<PullOutcome> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let records = self.store.retrieve().await?;

        let Some(record) = records.into_iter().next() else {
            tracing::info!("Remote store returned no records");
            return Ok(PullOutcome::Empty);
        };
        let json_text = serde_json::to_string(&record.data)?;

        let mut latest = self
            .latest_applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if ticket < *latest {
            tracing::info!(
                "Discarding stale pull #{} (pull #{} already applied)",
                ticket,
                *latest
            );
            return Ok(PullOutcome::Stale);
        }
        let report = self.operations.import_state(&json_text)?;
        *latest = ticket;
        tracing::info!("Applied remote state from pull #{}", ticket);
        Ok(PullOutcome::Applied(report))
    }
}
