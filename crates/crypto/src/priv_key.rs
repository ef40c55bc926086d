// Path: crates/crypto/src/priv_key.rs

use crate::hash::sha256;
use crate::signature::Signature;
use crate::{CryptoError, PublicKey};
use ed25519_dalek::Signer;
use k256::ecdsa::signature::Signer as _;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use parity_scale_codec::{Decode, Encode};
use rand::rngs::OsRng;
use std::fmt;

/// A typed private key.
///
/// Both variants store the 32-byte scalar/seed form. Construction always
/// validates the bytes, so signing cannot fail at run time.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum PrivateKey {
    /// 32-byte Ed25519 seed.
    #[codec(index = 1)]
    Ed25519([u8; 32]),
    /// 32-byte secp256k1 scalar.
    #[codec(index = 2)]
    Secp256k1([u8; 32]),
}

impl PrivateKey {
    /// Generates an Ed25519 key from OS randomness.
    pub fn generate_ed25519() -> Self {
        let sk = ed25519_dalek::SigningKey::generate(&mut OsRng);
        PrivateKey::Ed25519(sk.to_bytes())
    }

    /// Generates a secp256k1 key from OS randomness.
    pub fn generate_secp256k1() -> Self {
        let sk = k256::ecdsa::SigningKey::random(&mut OsRng);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&sk.to_bytes());
        PrivateKey::Secp256k1(bytes)
    }

    /// Derives an Ed25519 key deterministically as SHA-256 of `secret`.
    ///
    /// If the secret originates from user input, the caller must have
    /// passed it through a KDF first.
    pub fn from_secret_ed25519(secret: &[u8]) -> Self {
        PrivateKey::Ed25519(sha256(secret))
    }

    /// Derives a secp256k1 key deterministically as SHA-256 of `secret`.
    ///
    /// Same KDF caveat as [`PrivateKey::from_secret_ed25519`]. Fails only
    /// if the digest falls outside the curve's scalar range.
    pub fn from_secret_secp256k1(secret: &[u8]) -> Result<Self, CryptoError> {
        let digest = sha256(secret);
        k256::ecdsa::SigningKey::from_slice(&digest)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(PrivateKey::Secp256k1(digest))
    }

    /// Signs `msg`. Ed25519 signs the raw bytes; secp256k1 signs the
    /// SHA-256 digest (deterministic RFC-6979 nonces).
    pub fn sign(&self, msg: &[u8]) -> Signature {
        match self {
            PrivateKey::Ed25519(seed) => {
                let sk = ed25519_dalek::SigningKey::from_bytes(seed);
                Signature::Ed25519(sk.sign(msg).to_bytes())
            }
            PrivateKey::Secp256k1(scalar) => {
                let sk = k256::ecdsa::SigningKey::from_slice(scalar)
                    .expect("scalar validated on construction");
                let sig: k256::ecdsa::Signature = sk.sign(msg);
                let mut bytes = [0u8; 64];
                bytes.copy_from_slice(&sig.to_bytes());
                Signature::Secp256k1(bytes)
            }
        }
    }

    /// The corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        match self {
            PrivateKey::Ed25519(seed) => {
                let sk = ed25519_dalek::SigningKey::from_bytes(seed);
                PublicKey::Ed25519(sk.verifying_key().to_bytes())
            }
            PrivateKey::Secp256k1(scalar) => {
                let sk = k256::ecdsa::SigningKey::from_slice(scalar)
                    .expect("scalar validated on construction");
                let point = sk.verifying_key().to_encoded_point(true);
                let mut bytes = [0u8; 33];
                bytes.copy_from_slice(point.as_bytes());
                PublicKey::Secp256k1(bytes)
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivateKey::Ed25519(_) => f.write_str("PrivKeyEd25519(*****)"),
            PrivateKey::Secp256k1(_) => f.write_str("PrivKeySecp256k1(*****)"),
        }
    }
}
