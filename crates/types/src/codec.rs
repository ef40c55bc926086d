// Path: crates/types/src/codec.rs
//! Canonical binary serialization helpers.
//!
//! Every persisted and signed structure goes through these two functions so
//! that sign-bytes and on-wire bytes come from the same encoder. The
//! underlying format is SCALE: tagged unions are a one-byte index followed
//! by the variant fields in declaration order, sequences are
//! length-prefixed.

use parity_scale_codec::{Decode, Encode};

/// Encodes `value` into its canonical byte representation.
pub fn to_bytes_canonical<T: Encode>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Decodes a value from its canonical byte representation.
///
/// Fails on malformed input and on trailing bytes: a canonical encoding
/// is consumed exactly.
pub fn from_bytes_canonical<T: Decode>(bytes: &[u8]) -> Result<T, String> {
    let mut input = bytes;
    let value = T::decode(&mut input).map_err(|e| e.to_string())?;
    if !input.is_empty() {
        return Err(format!("{} trailing bytes after value", input.len()));
    }
    Ok(value)
}
