//! Resource-scoped auto-increment step cache

use dashmap::DashMap;
use rewind_commons::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type StepSlot = Arc<Mutex<Option<i64>>>;

/// Auto-increment step per resource id.
///
/// Shared by every branch running against a resource. A step is computed at
/// most once per resource: the loader runs holding that resource's slot, so
/// concurrent callers for the same resource wait for it and then read the
/// stored value. The map itself is only locked to fetch the slot; loads for
/// other resources never wait on a running load.
#[derive(Debug, Default)]
pub struct AutoIncrementStepCache {
    slots: DashMap<String, StepSlot>,
}

fn lock(slot: &StepSlot) -> MutexGuard<'_, Option<i64>> {
    // a panicking loader stored nothing, so the slot is still consistent
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AutoIncrementStepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached step; waits while a load for the same resource is running.
    pub fn get(&self, resource_id: &str) -> Option<i64> {
        let slot = self.slots.get(resource_id).map(|entry| Arc::clone(entry.value()))?;
        let step = *lock(&slot);
        step
    }

    /// Cached step, or the value produced by `load`.
    ///
    /// A failing `load` caches nothing; the next caller loads again.
    pub fn get_or_try_load<F>(&self, resource_id: &str, load: F) -> Result<i64>
    where
        F: FnOnce() -> Result<i64>,
    {
        let slot = Arc::clone(self.slots.entry(resource_id.to_string()).or_default().value());

        let mut cached = lock(&slot);
        if let Some(step) = *cached {
            return Ok(step);
        }
        let step = load()?;
        log::debug!("Cached auto-increment step {} for resource {}", step, resource_id);
        *cached = Some(step);
        Ok(step)
    }

    /// Drop the cached step of a resource, e.g. when it is unregistered.
    ///
    /// A load still running for the resource completes into the dropped slot;
    /// the next caller loads afresh.
    pub fn invalidate(&self, resource_id: &str) -> Option<i64> {
        let (_, slot) = self.slots.remove(resource_id)?;
        let step = *lock(&slot);
        step
    }

    /// Number of resources with a loaded step
    pub fn len(&self) -> usize {
        self.slot_snapshot().into_iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    fn slot_snapshot(&self) -> Vec<StepSlot> {
        self.slots.iter().map(|entry| Arc::clone(entry.value())).collect()
    }
}
