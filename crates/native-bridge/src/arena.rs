//! Arena of native resources keyed by opaque integer handles
//!
//! Handles are issued from a monotonic counter starting at 1 and are never
//! reused, so a stale handle can never alias an object allocated later.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::error::{BridgeError, Result};
use crate::handle::RawHandle;

#[derive(Debug)]
pub struct HandleArena<T> {
    slots: DashMap<u64, T>,
    next: AtomicU64,
    live: AtomicUsize,
    limit: Option<usize>,
}

impl<T> HandleArena<T> {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create an arena holding at most `limit` live objects
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            slots: DashMap::new(),
            next: AtomicU64::new(1),
            live: AtomicUsize::new(0),
            limit,
        }
    }

    /// Store `value` and return its new handle
    pub fn insert(&self, value: T) -> Result<RawHandle> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < limit).then_some(live + 1)
            })
            .map_err(|_| BridgeError::CapacityExceeded { limit })?;

        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.slots.insert(id, value);
        Ok(RawHandle::new(id))
    }

    /// Run `f` against the object behind `handle`, if it is still live
    pub fn with<R>(&self, handle: RawHandle, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slots.get(&handle.get()).map(|entry| f(entry.value()))
    }

    /// Remove the object behind `handle` when `predicate` accepts it
    pub fn remove_if(&self, handle: RawHandle, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        let removed = self
            .slots
            .remove_if(&handle.get(), |_, value| predicate(value))
            .map(|(_, value)| value);
        if removed.is_some() {
            self.live.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }

    pub fn remove(&self, handle: RawHandle) -> Option<T> {
        self.remove_if(handle, |_| true)
    }

    pub fn contains(&self, handle: RawHandle) -> bool {
        self.slots.contains_key(&handle.get())
    }

    pub fn len(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
