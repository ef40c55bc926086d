// Path: crates/types/src/tx.rs
//! The two transaction variants and their canonical sign-bytes.
//!
//! A transaction is an atomic operation on the ledger state: `SendTx`
//! moves coins between accounts, `AppTx` carries a payload to a named
//! plugin. On the wire both are a one-byte variant tag followed by the
//! fields in declaration order.
//!
//! Validation error strings in this module are consensus-visible; do not
//! reword them.

use crate::codec;
use crate::coin::{Coin, Coins};
use crate::error::ExecFailure;
use aurum_crypto::{hash, Address, PublicKey, Signature};
use parity_scale_codec::{Decode, Encode};

/// One funding source of a transaction.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct TxInput {
    /// The spending account (hash of its public key).
    pub address: Address,
    /// Coins to draw from the account.
    pub coins: Coins,
    /// Must be exactly one greater than the account's stored sequence.
    pub sequence: i64,
    /// Signature over the transaction's sign-bytes; `None` while unsigned.
    pub signature: Option<Signature>,
    /// Present iff `sequence == 1`: installs the account key on first use.
    pub pub_key: Option<PublicKey>,
}

impl TxInput {
    /// Builds an input for `pub_key`'s account. The key is attached only
    /// for a first-use input (`sequence == 1`); later inputs rely on the
    /// key already stored with the account.
    pub fn new(pub_key: PublicKey, coins: Coins, sequence: i64) -> Self {
        Self {
            address: pub_key.address(),
            coins,
            sequence,
            signature: None,
            pub_key: (sequence == 1).then_some(pub_key),
        }
    }

    /// Structural validation: coin well-formedness, sequence bounds, and
    /// the first-use public-key presence rule.
    pub fn validate_basic(&self) -> Result<(), ExecFailure> {
        if !self.coins.is_valid() {
            return Err(ExecFailure::invalid_input(format!(
                "Invalid coins {}",
                self.coins
            )));
        }
        if self.coins.is_zero() {
            return Err(ExecFailure::invalid_input("Coins cannot be zero"));
        }
        if self.sequence <= 0 {
            return Err(ExecFailure::invalid_input(
                "Sequence must be greater than 0",
            ));
        }
        if self.sequence == 1 && self.pub_key.is_none() {
            return Err(ExecFailure::invalid_input(
                "PubKey must be present when Sequence == 1",
            ));
        }
        if self.sequence > 1 && self.pub_key.is_some() {
            return Err(ExecFailure::invalid_input(
                "PubKey must be nil when Sequence > 1",
            ));
        }
        Ok(())
    }
}

/// One destination of a `SendTx`.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct TxOutput {
    /// The receiving account; created on first use.
    pub address: Address,
    /// Coins credited to the account.
    pub coins: Coins,
}

impl TxOutput {
    /// Structural validation of the output coins.
    pub fn validate_basic(&self) -> Result<(), ExecFailure> {
        if !self.coins.is_valid() {
            return Err(ExecFailure::invalid_output(format!(
                "Invalid coins {}",
                self.coins
            )));
        }
        if self.coins.is_zero() {
            return Err(ExecFailure::invalid_output("Coins cannot be zero"));
        }
        Ok(())
    }
}

/// Multi-input, multi-output coin transfer.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SendTx {
    /// Gas limit; carried on the wire, not metered by the kernel.
    pub gas: i64,
    /// A single fee coin deducted from the inputs.
    pub fee: Coin,
    /// Funding inputs, validated and applied in declaration order.
    pub inputs: Vec<TxInput>,
    /// Destinations, applied in declaration order.
    pub outputs: Vec<TxOutput>,
}

impl SendTx {
    /// Installs `sig` on the input matching `address`. Returns `false` if
    /// no input names that address.
    pub fn set_signature(&mut self, address: &Address, sig: Signature) -> bool {
        for input in &mut self.inputs {
            if &input.address == address {
                input.signature = Some(sig);
                return true;
            }
        }
        false
    }
}

/// A call into a registered plugin, funded by a single input.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct AppTx {
    /// Gas limit; carried on the wire, not metered by the kernel.
    pub gas: i64,
    /// A single fee coin, retained even when the plugin fails.
    pub fee: Coin,
    /// Name of the target plugin.
    pub name: String,
    /// The funding input; its coins minus the fee are forwarded.
    pub input: TxInput,
    /// Opaque payload handed to the plugin.
    pub data: Vec<u8>,
}

impl AppTx {
    /// Installs `sig` on the single input.
    pub fn set_signature(&mut self, sig: Signature) {
        self.input.signature = Some(sig);
    }
}

/// A transaction: the closed family of ledger operations.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum Tx {
    /// Coin transfer.
    #[codec(index = 1)]
    Send(SendTx),
    /// Plugin invocation.
    #[codec(index = 2)]
    App(AppTx),
}

impl Tx {
    /// The canonical bytes each input signs: the chain id followed by the
    /// transaction with every input signature stripped.
    ///
    /// Computed on a clone, so a shared transaction can never be observed
    /// with its signatures zeroed.
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        let mut unsigned = self.clone();
        match &mut unsigned {
            Tx::Send(tx) => {
                for input in &mut tx.inputs {
                    input.signature = None;
                }
            }
            Tx::App(tx) => {
                tx.input.signature = None;
            }
        }
        let mut bytes = codec::to_bytes_canonical(&chain_id.to_owned());
        bytes.extend(codec::to_bytes_canonical(&unsigned));
        bytes
    }

    /// The 20-byte transaction identifier: RIPEMD-160 of the sign-bytes.
    pub fn id(&self, chain_id: &str) -> [u8; 20] {
        hash::ripemd160(&self.sign_bytes(chain_id))
    }
}
