// Path: crates/app/src/app.rs
//! The consensus-driver facade.
//!
//! The driver serializes its calls: exactly one of `deliver_tx`,
//! `check_tx`, `commit`, or a block hook is in flight at a time. The
//! facade owns the live state and its check-time shadow; nothing else
//! mutates them.

use crate::exec;
use aurum_state::{KVCache, SharedStore, State, StoreBackend};
use aurum_types::codec;
use aurum_types::{
    Account, AccountSetter, ExecFailure, ExecResult, ExecSuccess, Plugin, Plugins, Validator,
};
use std::sync::Arc;

/// Transactions longer than this are rejected before decoding.
pub const MAX_TX_SIZE: usize = 10240;

/// The `set_option` prefix addressing chain-level settings rather than a
/// plugin.
pub const PLUGIN_NAME_BASE: &str = "base";

/// The application kernel: live state, check-time shadow, and plugins,
/// bound to the consensus-driver message interface.
pub struct Aurum<M: StoreBackend> {
    store: SharedStore<M>,
    state: State<SharedStore<M>>,
    check_cache: State<KVCache<SharedStore<M>>>,
    plugins: Plugins,
}

impl<M: StoreBackend> Aurum<M> {
    /// Builds the kernel on top of `backend`.
    pub fn new(backend: M) -> Self {
        let store = SharedStore::new(backend);
        let state = State::new(store.clone());
        let check_cache = State::wrapping("", store.clone());
        Self {
            store,
            state,
            check_cache,
            plugins: Plugins::new(),
        }
    }

    /// Human-readable version string for the driver's `info` call.
    pub fn info(&self) -> String {
        format!("Aurum v{}", env!("CARGO_PKG_VERSION"))
    }

    /// Registers a plugin. Must happen during bootstrap, before the driver
    /// starts feeding transactions.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.register(plugin);
    }

    /// Read access to the live state, for queries and tests.
    pub fn state(&self) -> &State<SharedStore<M>> {
        &self.state
    }

    /// Handles `set_option`. `base/<key>` mutates chain-level settings;
    /// `<plugin>/<key>` dispatches to the named plugin.
    pub fn set_option(&mut self, key: &str, value: &str) -> String {
        let (prefix, suffix) = split_key(key);
        if prefix != PLUGIN_NAME_BASE {
            let Some(plugin) = self.plugins.get_by_name(prefix) else {
                return format!("Invalid plugin name: {prefix}");
            };
            return plugin.set_option(&mut self.state, suffix, value);
        }
        match suffix {
            "chainID" => {
                self.state.set_chain_id(value);
                // the shadow signs and verifies against the same chain
                self.check_cache.set_chain_id(value);
                "Success".to_owned()
            }
            "account" => match serde_json::from_str::<Account>(value) {
                Err(err) => format!("Error decoding acc message: {err}"),
                Ok(account) => {
                    let Some(pub_key) = account.pub_key else {
                        return "Error decoding acc message: account has no pub_key".to_owned();
                    };
                    match self.state.set_account(&pub_key.address(), &account) {
                        Ok(()) => "Success".to_owned(),
                        Err(err) => format!("Error saving account: {err}"),
                    }
                }
            },
            _ => format!("Unrecognized option key {suffix}"),
        }
    }

    /// Executes a transaction against the live state.
    pub fn deliver_tx(&mut self, tx_bytes: &[u8]) -> ExecResult {
        let tx = decode_tx(tx_bytes)?;
        match exec::exec_tx(&mut self.state, &self.plugins, &tx, false) {
            Ok(_) => Ok(ExecSuccess::with_log("Success")),
            Err(err) => Err(err.prepend_log("Error in DeliverTx")),
        }
    }

    /// Validates a transaction against the check-time shadow. The live
    /// state is never touched on this path.
    pub fn check_tx(&mut self, tx_bytes: &[u8]) -> ExecResult {
        let tx = decode_tx(tx_bytes)?;
        match exec::exec_tx(&mut self.check_cache, &self.plugins, &tx, true) {
            Ok(_) => Ok(ExecSuccess::with_log("Success")),
            Err(err) => Err(err.prepend_log("Error in CheckTx")),
        }
    }

    /// Forwards a query to the backend.
    pub fn query(&self, data: &[u8]) -> ExecResult {
        if data.is_empty() {
            return Err(ExecFailure::encoding("Query cannot be zero length"));
        }
        match self.store.with(|backend| backend.query(data)) {
            Ok(value) => Ok(ExecSuccess {
                data: value,
                log: String::new(),
            }),
            Err(err) => Err(ExecFailure::internal(format!(
                "Failed to query backend: {err}"
            ))),
        }
    }

    /// Commits the live state to the backend and returns the new root
    /// hash, then re-creates the check-time shadow on top of the
    /// committed state.
    ///
    /// A backend failure here is fatal: replicas that cannot commit have
    /// already diverged, so the process aborts.
    pub fn commit(&mut self) -> (Vec<u8>, String) {
        let hash = match self.store.with_mut(|backend| backend.commit()) {
            Ok(hash) => hash,
            Err(err) => panic!("Error getting hash: {err}"),
        };
        self.check_cache = State::wrapping(self.state.chain_id().to_owned(), self.store.clone());
        tracing::info!(target: "app", root = %hex::encode(&hash), "commit");
        (hash, "Success".to_owned())
    }

    /// Passes the genesis validator set to every plugin, in registration
    /// order.
    pub fn init_chain(&mut self, validators: &[Validator]) {
        for plugin in self.plugins.list() {
            plugin.init_chain(&mut self.state, validators);
        }
    }

    /// Notifies every plugin of a new block, in registration order.
    pub fn begin_block(&mut self, height: u64) {
        for plugin in self.plugins.list() {
            plugin.begin_block(&mut self.state, height);
        }
    }

    /// Collects validator diffs from every plugin, in registration order.
    pub fn end_block(&mut self, height: u64) -> Vec<Validator> {
        let mut diffs = Vec::new();
        for plugin in self.plugins.list() {
            diffs.extend(plugin.end_block(&mut self.state, height));
        }
        diffs
    }
}

fn decode_tx(tx_bytes: &[u8]) -> Result<aurum_types::Tx, ExecFailure> {
    if tx_bytes.len() > MAX_TX_SIZE {
        return Err(ExecFailure::base_encoding("Tx size exceeds maximum"));
    }
    codec::from_bytes_canonical(tx_bytes)
        .map_err(|e| ExecFailure::base_encoding(format!("Error decoding tx: {e}")))
}

/// Splits `key` at the first `/`; without one, the suffix is empty.
fn split_key(key: &str) -> (&str, &str) {
    match key.split_once('/') {
        Some((prefix, suffix)) => (prefix, suffix),
        None => (key, ""),
    }
}
