//! Single-flight cache for analyzed libraries
//!
//! Maps an identity to a shared, immutable value. Concurrent requests for
//! the same key serialize on that key's slot, so at most one construction
//! runs per key; everyone else waits and then receives the same `Arc`.
//! Different keys never block each other beyond the brief map lookup.
//!
//! A failed construction leaves no entry behind: the caller that ran it gets
//! the error, and the next waiter (or the next request) tries again.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::errors::{ApiViewError, Result};

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

fn poisoned() -> ApiViewError {
    ApiViewError::Concurrency {
        message: "cache lock poisoned by a panicking builder".to_string(),
    }
}

pub struct SingleFlightCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for SingleFlightCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> std::fmt::Debug for SingleFlightCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlightCache").finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + Clone, V> SingleFlightCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: K) -> Result<Slot<V>> {
        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        Ok(Arc::clone(slots.entry(key).or_default()))
    }

    /// Return the cached value for `key`, running `build` if there is none
    ///
    /// # Errors
    ///
    /// Propagates the error of `build`, or `Concurrency` if a previous builder
    /// panicked while holding the slot.
    pub fn get_or_build<F>(&self, key: K, build: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        let slot = self.slot(key.clone())?;
        let mut value = slot.lock().map_err(|_| poisoned())?;
        if let Some(existing) = value.as_ref() {
            return Ok(Arc::clone(existing));
        }

        match build() {
            Ok(built) => {
                let built = Arc::new(built);
                *value = Some(Arc::clone(&built));
                Ok(built)
            }
            Err(err) => {
                drop(value);
                self.forget_if_empty(&key, &slot);
                Err(err)
            }
        }
    }

    /// Remove `key` if it still maps to `slot` and no one else holds the slot
    ///
    /// Waiters queued on the slot keep it alive; the last of them to fail
    /// removes it. Under the map lock no new holder can appear.
    fn forget_if_empty(&self, key: &K, slot: &Slot<V>) {
        let Ok(mut slots) = self.slots.lock() else {
            return;
        };
        let same_slot = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot));
        // One reference in the map, one in the caller
        if same_slot && Arc::strong_count(slot) == 2 {
            slots.remove(key);
        }
    }

    /// Number of keys with a slot, populated or not
    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    /// Cached value, if construction already succeeded
    ///
    /// Blocks while a construction for `key` is in flight.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = {
            let slots = self.slots.lock().ok()?;
            Arc::clone(slots.get(key)?)
        };
        let value = slot.lock().ok()?;
        value.as_ref().map(Arc::clone)
    }

    /// Drop the entry for `key`; returns whether a value was cached
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = match self.slots.lock() {
            Ok(mut slots) => slots.remove(key),
            Err(_) => None,
        };
        removed
            .and_then(|slot| slot.lock().ok().map(|value| value.is_some()))
            .unwrap_or(false)
    }

    /// Drop every entry
    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = match self.slots.lock() {
            Ok(slots) => slots.values().cloned().collect(),
            Err(_) => return 0,
        };
        slots
            .iter()
            .filter(|slot| slot.lock().map(|v| v.is_some()).unwrap_or(false))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
