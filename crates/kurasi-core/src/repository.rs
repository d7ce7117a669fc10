//! Repository traits for registry persistence.
//!
//! Each registry owns its entity list in memory and writes the whole list back
//! through an [`EntityRepository`] on every mutation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{KurasiError, Result};

/// An abstract repository for persisting one registry's entity list.
///
/// This trait decouples the registries from the storage mechanism
/// (key-value file store, in-memory store, remote API).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Schema versioning and migrations
/// - Seeding from older storage generations on first load
pub trait EntityRepository<T>: Send + Sync {
    /// Loads the full entity list.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<T>)`: All stored entities (empty when nothing is stored yet)
    /// - `Err(KurasiError)`: Error if the stored record cannot be read
    fn load_all(&self) -> Result<Vec<T>>;

    /// Saves the full entity list, replacing what was stored.
    ///
    /// # Arguments
    ///
    /// * `items` - The entities to save
    fn save_all(&self, items: &[T]) -> Result<()>;
}

/// A volatile repository holding the last saved list in memory.
///
/// Saves can be made to fail on demand, which lets callers exercise the
/// "persistence failed, memory untouched" path.
pub struct InMemoryRepository<T> {
    items: Mutex<Vec<T>>,
    fail_on_save: AtomicBool,
    save_count: AtomicUsize,
}

impl<T: Clone> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Creates a repository that reports `items` as already stored.
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
            fail_on_save: AtomicBool::new(false),
            save_count: AtomicUsize::new(0),
        }
    }

    /// Makes subsequent saves fail with an IO error.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Returns what was last saved.
    pub fn stored(&self) -> Vec<T> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: Clone> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> EntityRepository<T> for InMemoryRepository<T> {
    fn load_all(&self) -> Result<Vec<T>> {
        Ok(self.stored())
    }

    fn save_all(&self, items: &[T]) -> Result<()> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(KurasiError::io("in-memory repository configured to fail"));
        }
        *self.items.lock().unwrap_or_else(PoisonError::into_inner) = items.to_vec();
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
