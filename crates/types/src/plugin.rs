// Path: crates/types/src/plugin.rs
//! The plugin contract and the process-lifetime plugin registry.

use crate::account::Account;
use crate::coin::Coins;
use crate::error::ExecResult;
use crate::store::KVStore;
use aurum_crypto::Address;
use std::collections::HashMap;
use std::sync::Arc;

/// A consensus validator as seen by the driver interface: opaque key
/// bytes and a voting power. `end_block` returns diffs in this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// The validator's public key bytes, opaque to the kernel.
    pub pub_key: Vec<u8>,
    /// Voting power; zero in a diff removes the validator.
    pub power: u64,
}

/// The per-call context handed to a plugin.
///
/// Passed by value: `caller_account` is a snapshot taken after the fee
/// and input coins were deducted, and the plugin must not assume it
/// aliases live state.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// The caller's address.
    pub caller_address: Address,
    /// The caller's account after fee and input deduction.
    pub caller_account: Account,
    /// The coins forwarded to the plugin: input coins minus the fee.
    pub coins: Coins,
}

impl CallContext {
    /// Assembles a call context.
    pub fn new(caller_address: Address, caller_account: Account, coins: Coins) -> Self {
        Self {
            caller_address,
            caller_account,
            coins,
        }
    }
}

/// A named handler for application transactions, with lifecycle hooks on
/// chain initialization and block boundaries.
///
/// The store handle a hook receives is scoped to that call; plugins must
/// not retain it.
pub trait Plugin: Send + Sync {
    /// The registry name; short, non-empty, unique per process.
    fn name(&self) -> &str;

    /// Executes an application transaction against `store`.
    fn run_tx(&self, store: &mut dyn KVStore, ctx: CallContext, tx_bytes: &[u8]) -> ExecResult;

    /// Handles a `<plugin-name>/<key>` option from the driver.
    fn set_option(&self, store: &mut dyn KVStore, key: &str, value: &str) -> String {
        let _ = (store, key, value);
        String::new()
    }

    /// Called once with the genesis validator set.
    fn init_chain(&self, store: &mut dyn KVStore, validators: &[Validator]) {
        let _ = (store, validators);
    }

    /// Called at the start of every block.
    fn begin_block(&self, store: &mut dyn KVStore, height: u64) {
        let _ = (store, height);
    }

    /// Called at the end of every block; returns validator-set diffs.
    fn end_block(&self, store: &mut dyn KVStore, height: u64) -> Vec<Validator> {
        let _ = (store, height);
        Vec::new()
    }
}

/// The plugin registry: lookup by name, iteration in registration order.
///
/// Registration happens once at application bootstrap and the registry is
/// immutable afterwards; removal is not supported. Iteration order is
/// consensus-relevant, so it uses the registration list, never the map.
#[derive(Default)]
pub struct Plugins {
    by_name: HashMap<String, Arc<dyn Plugin>>,
    ordered: Vec<Arc<dyn Plugin>>,
}

impl Plugins {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin`.
    ///
    /// Panics on an empty or already-registered name: both are bootstrap
    /// bugs that would otherwise diverge replicas.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        let name = plugin.name().to_owned();
        if name.is_empty() {
            panic!("Plugin name cannot be blank");
        }
        if self.by_name.contains_key(&name) {
            panic!("Plugin already exists by the name of {name}");
        }
        self.by_name.insert(name, plugin.clone());
        self.ordered.push(plugin);
    }

    /// Looks a plugin up by name.
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.by_name.get(name)
    }

    /// All plugins in registration order.
    pub fn list(&self) -> &[Arc<dyn Plugin>] {
        &self.ordered
    }
}
