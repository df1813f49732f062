use avaproof_core_types::{BuildError, DelegateError};
use avaproof_validation::{FormatError, ProofValidationError};
use thiserror::Error;

/// Errors reported by [`ProofService`](crate::ProofService) queries.
///
/// The messages are part of the query interface and must stay stable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("Proof must be an hexadecimal string")]
    ProofNotHex,

    #[error("Proof has invalid format")]
    ProofInvalidFormat,

    /// The proof parsed but broke a rule. Displays the rule's short name.
    #[error("The proof is invalid: {0}")]
    ProofRejected(ProofValidationError),

    /// Delegating requires a proof that verifies on its own.
    #[error("The proof is invalid")]
    InvalidProof,

    #[error("The private key is invalid")]
    InvalidPrivateKey,

    #[error("The supplied delegation is not valid")]
    InvalidDelegation,

    #[error("The private key does not match the proof or the delegation")]
    KeyMismatch,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Delegation must be an hexadecimal string")]
    DelegationNotHex,

    #[error("Delegation has invalid format")]
    DelegationInvalidFormat,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to build the proof: {0}")]
    Build(#[from] BuildError),

    #[error("Failed to delegate: {0}")]
    Delegate(DelegateError),
}

impl NodeError {
    pub(crate) fn from_proof_format(e: FormatError) -> Self {
        if e.is_hex() {
            Self::ProofNotHex
        } else {
            Self::ProofInvalidFormat
        }
    }

    pub(crate) fn from_delegation_format(e: FormatError) -> Self {
        if e.is_hex() {
            Self::DelegationNotHex
        } else {
            Self::DelegationInvalidFormat
        }
    }
}

impl From<DelegateError> for NodeError {
    fn from(e: DelegateError) -> Self {
        match e {
            DelegateError::AuthorityMismatch { .. } => Self::KeyMismatch,
            e => Self::Delegate(e),
        }
    }
}
