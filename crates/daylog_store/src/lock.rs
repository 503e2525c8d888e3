//! Per-collection lock registry.

use parking_lot::{FairMutex, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Serializes read-modify-write cycles per collection.
///
/// The registry maps a collection identifier to a fair mutex. Callers of
/// [`with_exclusive`](Self::with_exclusive) on the same identifier run
/// strictly one at a time in arrival order; distinct identifiers never
/// block each other.
///
/// The registry is an owned instance, not process-global state. A slot is
/// pruned as soon as the last caller for its identifier finishes, so
/// memory stays proportional to the number of concurrently active
/// collections.
#[derive(Debug, Default)]
pub struct LockRegistry {
    slots: Mutex<HashMap<String, Arc<FairMutex<()>>>>,
}

impl LockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `op` while holding the exclusive lock for `collection_id`.
    ///
    /// Lock acquisition is FIFO: whoever calls first for a given
    /// identifier runs first. The lock is released when `op` returns,
    /// whether it succeeded or not; an error value returned by `op`
    /// propagates to the caller and never blocks queued operations.
    pub fn with_exclusive<R>(&self, collection_id: &str, op: impl FnOnce() -> R) -> R {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(
                slots
                    .entry(collection_id.to_string())
                    .or_insert_with(|| Arc::new(FairMutex::new(()))),
            )
        };

        let result = {
            let _guard = slot.lock();
            op()
        };

        // Prune the slot if nobody else holds a handle to it. Handles are
        // only cloned under the registry mutex, so the count is stable here.
        {
            let mut slots = self.slots.lock();
            if Arc::strong_count(&slot) == 2 {
                slots.remove(collection_id);
            }
        }

        result
    }

    /// Returns the number of collections with a live lock slot.
    ///
    /// Drains to zero once all in-flight operations finish.
    #[must_use]
    pub fn active_collections(&self) -> usize {
        self.slots.lock().len()
    }
}
