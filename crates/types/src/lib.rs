// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Core data structures, error types, and the plugin contract for Aurum.

pub mod account;
pub mod codec;
pub mod coin;
pub mod error;
pub mod plugin;
pub mod store;
pub mod tx;

pub use account::{Account, AccountGetter, AccountSetter};
pub use coin::{Coin, Coins};
pub use error::{Code, CoinError, ExecFailure, ExecResult, ExecSuccess, StateError};
pub use plugin::{CallContext, Plugin, Plugins, Validator};
pub use store::KVStore;
pub use tx::{AppTx, SendTx, Tx, TxInput, TxOutput};
