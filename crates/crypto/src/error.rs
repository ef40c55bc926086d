// Path: crates/crypto/src/error.rs

use thiserror::Error;

/// Errors raised while constructing key material.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The bytes do not form a valid key for the scheme.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}
