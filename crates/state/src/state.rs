// Path: crates/state/src/state.rs

use crate::cache::KVCache;
use aurum_crypto::Address;
use aurum_types::codec;
use aurum_types::{Account, AccountGetter, AccountSetter, KVStore, StateError};

/// Account keys live under this prefix; the layout is owned by this
/// module and opaque to the executor.
const ACCOUNT_PREFIX: &[u8] = b"base/a/";

/// The accounts-and-chain-id view over a KV store.
///
/// `State` is generic over its store so the same type serves the live
/// backend view, the long-lived check-tx shadow (a [`KVCache`] over a
/// shared backend handle), and the per-transaction plugin cache. It also
/// implements [`KVStore`] itself, which is how a cache-wrapped state is
/// handed to plugins as their scoped store.
pub struct State<S> {
    chain_id: String,
    store: S,
}

impl<S: KVStore> State<S> {
    /// A view over `store` with an empty chain id.
    pub fn new(store: S) -> Self {
        Self {
            chain_id: String::new(),
            store,
        }
    }

    /// The chain id mixed into every sign-bytes computation.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Sets the chain id. Held in memory only; the driver configures it
    /// once at genesis.
    pub fn set_chain_id(&mut self, chain_id: impl Into<String>) {
        self.chain_id = chain_id.into();
    }

    /// Wraps this state in a write-buffering child. The child reads
    /// through to this state and buffers writes until
    /// [`State::cache_sync`] or drop.
    pub fn cache_wrap(&mut self) -> State<KVCache<&mut S>> {
        State {
            chain_id: self.chain_id.clone(),
            store: KVCache::new(&mut self.store),
        }
    }
}

impl<P: KVStore> State<KVCache<P>> {
    /// Builds a state view directly over a cache of `parent`, for the
    /// long-lived check-tx shadow.
    pub fn wrapping(chain_id: impl Into<String>, parent: P) -> Self {
        Self {
            chain_id: chain_id.into(),
            store: KVCache::new(parent),
        }
    }

    /// Publishes the buffered writes to the parent store.
    pub fn cache_sync(&mut self) -> Result<(), StateError> {
        self.store.cache_sync()
    }
}

impl<S: KVStore> KVStore for State<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.store.get(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.store.set(key, value)
    }
}

fn account_key(address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(ACCOUNT_PREFIX.len() + 20);
    key.extend_from_slice(ACCOUNT_PREFIX);
    key.extend_from_slice(address.as_ref());
    key
}

impl<S: KVStore> AccountGetter for State<S> {
    fn get_account(&self, address: &Address) -> Result<Option<Account>, StateError> {
        match self.store.get(&account_key(address))? {
            None => Ok(None),
            Some(bytes) => codec::from_bytes_canonical(&bytes)
                .map(Some)
                .map_err(StateError::Corrupt),
        }
    }
}

impl<S: KVStore> AccountSetter for State<S> {
    fn set_account(&mut self, address: &Address, account: &Account) -> Result<(), StateError> {
        self.store
            .set(&account_key(address), &codec::to_bytes_canonical(account))
    }
}
