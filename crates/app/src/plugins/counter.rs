// Path: crates/app/src/plugins/counter.rs
//! A minimal plugin: counts its invocations and charges an app-level fee
//! out of the forwarded coins.

use aurum_types::codec;
use aurum_types::{CallContext, Coins, ExecFailure, ExecResult, ExecSuccess, KVStore, Plugin};
use parity_scale_codec::{Decode, Encode};

/// The payload of a counter transaction, carried in `AppTx::data`.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct CounterTx {
    /// Must be true; a false value makes the transaction fail, which
    /// exercises the kernel's refund path.
    pub valid: bool,
    /// Fee the plugin charges out of the forwarded coins.
    pub fee: Coins,
}

/// Persistent counter state, stored under a plugin-name-scoped key.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct CounterPluginState {
    /// Number of successful counter transactions.
    pub counter: u64,
    /// Sum of all app-level fees charged so far.
    pub total_fees: Coins,
}

/// The counter plugin.
pub struct CounterPlugin {
    name: String,
}

impl CounterPlugin {
    /// A counter plugin registered under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The storage key of this plugin instance's state.
    pub fn state_key(&self) -> Vec<u8> {
        format!("{}/state", self.name).into_bytes()
    }

    fn load_state(&self, store: &dyn KVStore) -> Result<CounterPluginState, ExecFailure> {
        match store.get(&self.state_key())? {
            None => Ok(CounterPluginState::default()),
            Some(bytes) => codec::from_bytes_canonical(&bytes)
                .map_err(|e| ExecFailure::internal(format!("Corrupt counter state: {e}"))),
        }
    }

    fn save_state(
        &self,
        store: &mut dyn KVStore,
        state: &CounterPluginState,
    ) -> Result<(), ExecFailure> {
        store.set(&self.state_key(), &codec::to_bytes_canonical(state))?;
        Ok(())
    }
}

impl Plugin for CounterPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn run_tx(&self, store: &mut dyn KVStore, ctx: CallContext, tx_bytes: &[u8]) -> ExecResult {
        let tx: CounterTx = codec::from_bytes_canonical(tx_bytes)
            .map_err(|e| ExecFailure::base_encoding(format!("Error decoding CounterTx: {e}")))?;

        if !tx.valid {
            return Err(ExecFailure::internal("CounterTx.Valid must be true"));
        }
        if !tx.fee.is_valid() {
            return Err(ExecFailure::internal(
                "CounterTx.Fee is not sorted or has zero amounts",
            ));
        }
        if !ctx.coins.is_gte(&tx.fee) {
            return Err(ExecFailure::insufficient_funds(
                "CounterTx.Fee is not covered by context.Coins",
            ));
        }

        let mut state = self.load_state(store)?;
        state.counter += 1;
        state.total_fees = state.total_fees.plus(&tx.fee)?;
        self.save_state(store, &state)?;

        Ok(ExecSuccess::default())
    }
}
