// Path: crates/crypto/src/signature.rs

use parity_scale_codec::{Decode, Encode};
use std::fmt;

/// A typed signature matching one of the key variants.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum Signature {
    /// 64-byte Ed25519 signature.
    #[codec(index = 1)]
    Ed25519([u8; 64]),
    /// 64-byte fixed-width secp256k1 ECDSA signature (r ‖ s).
    #[codec(index = 2)]
    Secp256k1([u8; 64]),
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Ed25519(sig) => write!(f, "SigEd25519({})", hex::encode_upper(&sig[..8])),
            Signature::Secp256k1(sig) => {
                write!(f, "SigSecp256k1({})", hex::encode_upper(&sig[..8]))
            }
        }
    }
}
