// Path: crates/crypto/src/pub_key.rs

use crate::hash::{ripemd160, sha256};
use crate::signature::Signature;
use crate::{Address, TYPE_ED25519};
use ed25519_dalek::Verifier;
use k256::ecdsa::signature::Verifier as _;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed public key: one of the two supported schemes.
///
/// Absence of a key is expressed as `Option<PublicKey>`; the `None` marker
/// is the single canonical "empty key" encoding.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PublicKey {
    /// 32-byte Ed25519 verifying key.
    #[codec(index = 1)]
    Ed25519(#[serde(with = "hex::serde")] [u8; 32]),
    /// 33-byte SEC1-compressed secp256k1 point.
    #[codec(index = 2)]
    Secp256k1(#[serde(with = "hex::serde")] [u8; 33]),
}

// serde's derived `Deserialize` for adjacently-tagged enums requires every
// variant field type to implement `Deserialize` (used internally as a
// "missing field" fallback), even when the field has `#[serde(with = ...)]`.
// `[u8; 33]` has no such impl (core serde only covers arrays up to 32
// elements), so the derive is replaced here with a hand-written impl that
// reproduces the exact same `{"type": ..., "data": <hex>}` wire format.
impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "snake_case")]
        enum Tag {
            Ed25519,
            Secp256k1,
        }

        #[derive(Deserialize)]
        struct Tagged {
            #[serde(rename = "type")]
            tag: Tag,
            data: String,
        }

        let tagged = Tagged::deserialize(deserializer)?;
        let bytes = hex::decode(&tagged.data).map_err(serde::de::Error::custom)?;
        match tagged.tag {
            Tag::Ed25519 => {
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
                Ok(PublicKey::Ed25519(arr))
            }
            Tag::Secp256k1 => {
                let arr: [u8; 33] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 33 bytes"))?;
                Ok(PublicKey::Secp256k1(arr))
            }
        }
    }
}

impl PublicKey {
    /// Derives the 20-byte account address.
    ///
    /// Ed25519: RIPEMD-160 over the wire tag followed by the
    /// length-prefixed key bytes. Secp256k1: Bitcoin-style
    /// RIPEMD-160(SHA-256(compressed key)).
    pub fn address(&self) -> Address {
        match self {
            PublicKey::Ed25519(key) => {
                let mut preimage = vec![TYPE_ED25519];
                preimage.extend(key.to_vec().encode());
                Address(ripemd160(&preimage))
            }
            PublicKey::Secp256k1(key) => Address(ripemd160(&sha256(&key[..]))),
        }
    }

    /// Verifies `sig` over `msg`.
    ///
    /// Returns `false` (never an error) when the signature variant does
    /// not match the key variant, when the key bytes do not decode to a
    /// valid point, or when verification fails. Cross-variant mismatch is
    /// a forgery attempt, not a caller bug.
    pub fn verify_bytes(&self, msg: &[u8], sig: &Signature) -> bool {
        match (self, sig) {
            (PublicKey::Ed25519(key), Signature::Ed25519(sig_bytes)) => {
                let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(key) else {
                    return false;
                };
                let sig = ed25519_dalek::Signature::from_bytes(sig_bytes);
                vk.verify(msg, &sig).is_ok()
            }
            (PublicKey::Secp256k1(key), Signature::Secp256k1(sig_bytes)) => {
                let Ok(vk) = k256::ecdsa::VerifyingKey::from_sec1_bytes(&key[..]) else {
                    return false;
                };
                let Ok(sig) = k256::ecdsa::Signature::from_slice(&sig_bytes[..]) else {
                    return false;
                };
                // k256 hashes the message with SHA-256 internally, the
                // same digest the signing side applies.
                vk.verify(msg, &sig).is_ok()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Ed25519(key) => write!(f, "PubKeyEd25519({})", hex::encode_upper(key)),
            PublicKey::Secp256k1(key) => {
                write!(f, "PubKeySecp256k1({})", hex::encode_upper(key))
            }
        }
    }
}
