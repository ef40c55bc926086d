// Path: crates/types/src/account.rs
//! Accounts and the polymorphic account-access seam.

use crate::coin::Coins;
use crate::error::StateError;
use aurum_crypto::{Address, PublicKey};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An addressed bag of coins with a replay-protection sequence number.
///
/// Invariant: when `pub_key` is set, its derived address equals the
/// address the account is stored under. A freshly created account has
/// sequence 0 and no key; the key is installed by the first transaction
/// input that references the account.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Account {
    /// The account's public key, absent until first use.
    pub pub_key: Option<PublicKey>,
    /// Strictly incremented once per successful input naming this account.
    pub sequence: i64,
    /// The account balance.
    pub balance: Coins,
}

/// Read access to accounts.
///
/// The executor is written against this seam rather than a concrete state
/// type so the same code runs over the live state and over any
/// cache-wrapped child.
pub trait AccountGetter {
    /// Loads the account stored under `address`, if any.
    fn get_account(&self, address: &Address) -> Result<Option<Account>, StateError>;
}

/// Write access to accounts.
pub trait AccountSetter {
    /// Stores `account` under `address`, replacing any previous value.
    fn set_account(&mut self, address: &Address, account: &Account) -> Result<(), StateError>;
}
