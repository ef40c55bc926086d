// Path: crates/crypto/src/hash.rs
//! Hash helpers shared by address derivation and transaction identifiers.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// RIPEMD-160 of `bytes`.
pub fn ripemd160(bytes: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(bytes);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}
