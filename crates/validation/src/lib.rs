//! Admissibility rules for avalanche proofs and delegations.
//!
//! Verification is pure: it reads a [`Proof`] (and optionally a [`Delegation`])
//! and either accepts it or names the first rule it breaks. Rules are checked
//! in a fixed order, so a proof breaking several of them is always rejected
//! for the same reason.
//!
//! [`Proof`]: avaproof_core_types::Proof
//! [`Delegation`]: avaproof_core_types::Delegation

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod delegation;
mod error;
mod format;
mod ledger;
mod verifier;

pub use delegation::verify_delegation;
pub use error::{DelegationValidationError, ProofValidationError};
pub use format::{decode_delegation_hex, decode_proof_hex, FormatError};
pub use ledger::{
    ClaimedCoin, Coin, CoinView, MemoryCoinView, StakeCheckError, StakeIssue, StakeValidator,
};
pub use verifier::{verify_proof, ProofVerifier, VerifiedProof};
