//! The node-facing surface of avalanche proofs.
//!
//! [`ProofService`] answers the string-based queries an operator or a peer
//! sends (build, decode, verify, delegate, admit), reporting failures with
//! stable messages. [`StartupValidator`] decides, once the ledger is synced,
//! whether the node may run with its configured proof.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod error;
mod service;
mod startup;
mod view;

pub use error::NodeError;
pub use service::{ProofService, StakeRequest};
pub use startup::{LocalProof, StartupError, StartupState, StartupValidator};
pub use view::{DecodedDelegation, DecodedLevel, DecodedProof, DecodedStake, PeerInfo};
