use crate::{Amount, COIN};

/// Maximum number of stakes a proof may carry.
pub const MAX_PROOF_STAKES: usize = 1000;

/// Minimum amount per stake.
pub const PROOF_DUST_THRESHOLD: Amount = COIN;

/// Default cap on the number of levels in a delegation chain.
pub const DEFAULT_MAX_DELEGATION_LEVELS: usize = 20;

/// Admissibility parameters for proofs and delegations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProofParams {
    /// Stakes below this amount are rejected
    pub dust_threshold: Amount,

    /// Proofs with more stakes than this are rejected
    pub max_stakes: usize,

    /// Delegations with more levels than this are rejected
    pub max_delegation_levels: usize,
}

impl Default for ProofParams {
    fn default() -> Self {
        Self {
            dust_threshold: PROOF_DUST_THRESHOLD,
            max_stakes: MAX_PROOF_STAKES,
            max_delegation_levels: DEFAULT_MAX_DELEGATION_LEVELS,
        }
    }
}
