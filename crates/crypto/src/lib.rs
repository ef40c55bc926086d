//! # Aurum cryptography
//!
//! Typed public keys, private keys, and signatures for the two supported
//! schemes (Ed25519 and secp256k1), plus the 20-byte account address
//! derivation. The variant families are closed: they are sum types
//! dispatched on a one-byte wire tag, not open trait objects.

#![forbid(unsafe_code)]

mod address;
mod error;
pub mod hash;
mod priv_key;
mod pub_key;
mod signature;

pub use address::Address;
pub use error::CryptoError;
pub use priv_key::PrivateKey;
pub use pub_key::PublicKey;
pub use signature::Signature;

/// Wire tag of the Ed25519 variant across all key/signature families.
pub const TYPE_ED25519: u8 = 0x01;
/// Wire tag of the secp256k1 variant across all key/signature families.
pub const TYPE_SECP256K1: u8 = 0x02;
