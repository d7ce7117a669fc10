use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entity_module::OpOutcome;
use crate::error::Result;
use crate::repository::EntityRepository;

/// A persisted, lock-guarded entity list shared by the three registries.
///
/// Mutations run on a clone of the list; the clone is persisted and only then
/// swapped in, all under the write lock. A failed save leaves memory as it was.
pub(crate) struct EntityCollection<T> {
    items: RwLock<Vec<T>>,
    repository: Arc<dyn EntityRepository<T>>,
    label: &'static str,
}

impl<T: Clone> EntityCollection<T> {
    /// Loads the initial list from `repository`.
    pub(crate) fn load(repository: Arc<dyn EntityRepository<T>>, label: &'static str) -> Result<Self> {
        let items = repository.load_all()?;
        tracing::debug!("Loaded {} {} entries", items.len(), label);
        Ok(Self {
            items: RwLock::new(items),
            repository,
            label,
        })
    }

    // A poisoned lock never holds a half-applied list, so it is safe to keep using it.
    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.read().clone()
    }

    pub(crate) fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.read().iter().find(|item| predicate(item)).cloned()
    }

    /// Runs `f` on a working copy and commits it when `changed` says so.
    fn commit<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R, changed: impl Fn(&R) -> bool) -> Result<R> {
        let mut guard = self.write();
        let mut working = guard.clone();
        let result = f(&mut working);
        if changed(&result) {
            self.repository.save_all(&working)?;
            *guard = working;
        }
        Ok(result)
    }

    /// Applies an outcome-reporting mutation; persists only when it applied.
    pub(crate) fn apply(&self, f: impl FnOnce(&mut Vec<T>) -> OpOutcome) -> Result<OpOutcome> {
        self.commit(f, |outcome| outcome.is_applied())
    }

    /// Applies a counting mutation; persists only when something was touched.
    pub(crate) fn apply_counted(&self, f: impl FnOnce(&mut Vec<T>) -> usize) -> Result<usize> {
        self.commit(f, |count| *count > 0)
    }

    /// Applies a mutation that always changes state.
    pub(crate) fn apply_always(&self, f: impl FnOnce(&mut Vec<T>)) -> Result<()> {
        self.commit(f, |_| true)
    }

    /// Replaces the whole list.
    pub(crate) fn replace(&self, items: Vec<T>) -> Result<()> {
        let mut guard = self.write();
        self.repository.save_all(&items)?;
        tracing::debug!("Replaced {} list with {} entries", self.label, items.len());
        *guard = items;
        Ok(())
    }
}
