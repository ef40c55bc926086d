// Path: crates/state/src/cache.rs

use aurum_types::{KVStore, StateError};
use std::collections::HashMap;

/// A write-buffering overlay over a parent store.
///
/// Reads check the local write set first and fall through to the parent
/// on a miss, so parent mutations made after the wrap stay visible.
/// Writes stay local until [`KVCache::cache_sync`] replays them onto the
/// parent in first-write order. Dropping an unsynced cache discards its
/// buffer and never affects the parent. Caches nest: a `KVCache` is
/// itself a [`KVStore`].
pub struct KVCache<S> {
    parent: S,
    writes: HashMap<Vec<u8>, Vec<u8>>,
    // First-write key order; replay must not depend on map iteration.
    order: Vec<Vec<u8>>,
}

impl<S: KVStore> KVCache<S> {
    /// Wraps `parent` with an empty write buffer.
    pub fn new(parent: S) -> Self {
        Self {
            parent,
            writes: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Replays the buffered writes onto the parent in first-write order,
    /// then clears the buffer.
    pub fn cache_sync(&mut self) -> Result<(), StateError> {
        for key in self.order.drain(..) {
            let value = self
                .writes
                .remove(&key)
                .expect("every ordered key has a buffered write");
            self.parent.set(&key, &value)?;
        }
        self.writes.clear();
        Ok(())
    }
}

impl<S: KVStore> KVStore for KVCache<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }
        self.parent.get(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        if self.writes.insert(key.to_vec(), value.to_vec()).is_none() {
            self.order.push(key.to_vec());
        }
        Ok(())
    }
}
