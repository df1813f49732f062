//! Core types for stake-backed avalanche proofs.
//!
//! A [`Proof`] bundles a set of signed [`Stake`]s under a master public key.
//! It is identified two ways:
//!
//! - its [`LimitedProofId`], a hash over the sequence, expiration and stakes,
//!   which does not depend on the master key;
//! - its [`ProofId`], which additionally commits to the master key.
//!
//! A [`Delegation`] transfers the signing authority of a proof from its master
//! key to another key, one signed level at a time, without touching the stakes.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod amount;
mod builder;
mod delegation;
mod hash;
mod outpoint;
mod params;
mod proof;
mod stake;

pub use amount::{Amount, COIN};
pub use builder::{BuildError, DelegateError, DelegationBuilder, ProofBuilder, StakeClaim};
pub use delegation::{Delegation, DelegationId, DelegationLevel};
pub use hash::{Hash256, HashWriter, LimitedProofId, ProofId, TxId};
pub use outpoint::OutPoint;
pub use params::{
    ProofParams, DEFAULT_MAX_DELEGATION_LEVELS, MAX_PROOF_STAKES, PROOF_DUST_THRESHOLD,
};
pub use proof::Proof;
pub use stake::{SignedStake, Stake, MAX_STAKE_HEIGHT};

pub use avaproof_signing_ecdsa::{PrivateKey, PublicKey, Signature};
