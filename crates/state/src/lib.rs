// Path: crates/state/src/lib.rs
#![forbid(unsafe_code)]

//! State layer for the Aurum kernel.
//!
//! Three pieces: [`KVCache`], a write-buffering overlay that is either
//! synced into its parent or discarded; the [`StoreBackend`] trait for the
//! authenticated backend (with [`MemStore`] as the in-memory
//! implementation); and [`State`], the accounts-and-chain-id view the
//! executor works against.

mod cache;
mod state;
mod store;

pub use cache::KVCache;
pub use state::State;
pub use store::{MemStore, SharedStore, StoreBackend};
