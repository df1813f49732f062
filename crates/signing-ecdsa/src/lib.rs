//! secp256k1 ECDSA signing scheme used by avalanche proofs and delegations.
//!
//! Public keys travel in their 33-byte compressed SEC1 form and signatures
//! as 64-byte compact `r || s` pairs. Every message is a 32-byte digest,
//! so signing and verification always go through the prehash APIs.

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

use thiserror::Error;

mod private_key;
mod public_key;
mod sig;
mod wif;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use sig::Signature;
pub use wif::WifNetwork;

pub use k256;

/// Length of a serialized private key.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Length of a compressed SEC1 public key.
pub const PUBLIC_KEY_SIZE: usize = 33;

/// Length of a compact ECDSA signature.
pub const SIGNATURE_SIZE: usize = 64;

/// Errors raised while parsing keys.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum KeyError {
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid WIF encoding: {0}")]
    InvalidWif(String),

    #[error("Private key is not a valid secp256k1 scalar")]
    InvalidPrivateKey,

    #[error("Public key is not a valid compressed secp256k1 point")]
    InvalidPublicKey,
}

/// Errors raised while producing or checking a signature.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The 64 bytes do not encode a valid `(r, s)` pair.
    #[error("Malformed signature")]
    Malformed,

    /// The signature does not match the public key and message.
    #[error("Signature verification failed")]
    Mismatch,

    #[error("Signing failed: {0}")]
    Signing(String),
}
