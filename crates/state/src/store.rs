// Path: crates/state/src/store.rs

use aurum_types::{KVStore, StateError};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The authenticated KV backend the kernel commits to.
///
/// The real backend is a merkle store shared with all consensus
/// participants; the kernel only relies on this narrow surface.
pub trait StoreBackend: KVStore {
    /// Persists all staged writes and returns the new root hash.
    fn commit(&mut self) -> Result<Vec<u8>, StateError>;
    /// Answers a driver query; `data` is an opaque request (here: a key).
    fn query(&self, data: &[u8]) -> Result<Vec<u8>, StateError>;
}

/// In-memory [`StoreBackend`] used by tests and local runs.
///
/// The root hash folds the sorted contents through SHA-256. That is not a
/// merkle proof structure, but it is deterministic and collision-safe
/// enough to stand in for one behind the same interface.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KVStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

impl StoreBackend for MemStore {
    fn commit(&mut self) -> Result<Vec<u8>, StateError> {
        let mut hasher = Sha256::new();
        for (key, value) in &self.data {
            hasher.update((key.len() as u64).to_le_bytes());
            hasher.update(key);
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(value);
        }
        Ok(hasher.finalize().to_vec())
    }

    fn query(&self, data: &[u8]) -> Result<Vec<u8>, StateError> {
        Ok(self.data.get(data).cloned().unwrap_or_default())
    }
}

/// A cloneable handle to a backend shared by several store views.
///
/// The live state and the check-time shadow cache both sit on the same
/// backend; this handle gives each of them [`KVStore`] access. The kernel
/// is single-threaded per consensus step, so the lock is uncontended and
/// only enforces exclusive mutation.
pub struct SharedStore<M> {
    inner: Arc<RwLock<M>>,
}

impl<M> SharedStore<M> {
    /// Wraps `backend` into a shared handle.
    pub fn new(backend: M) -> Self {
        Self {
            inner: Arc::new(RwLock::new(backend)),
        }
    }

    /// Runs `f` with exclusive access to the backend.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Runs `f` with shared access to the backend.
    pub fn with<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<M> Clone for SharedStore<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: KVStore> KVStore for SharedStore<M> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.inner.read().get(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.inner.write().set(key, value)
    }
}
