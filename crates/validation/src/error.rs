use avaproof_core_types::{Amount, LimitedProofId, OutPoint};
use thiserror::Error;

/// Why a delegation was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DelegationValidationError {
    /// The delegation has no level at all.
    #[error("The delegation has no level")]
    Empty,

    /// The delegation was issued for another proof.
    #[error("The delegation is for proof {actual}, expected {expected}")]
    ProofMismatch {
        /// Limited id of the proof being verified
        expected: LimitedProofId,
        /// Limited id the delegation refers to
        actual: LimitedProofId,
    },

    /// The chain is longer than allowed.
    #[error("The delegation has {levels} levels, the maximum is {max}")]
    TooManyLevels { levels: usize, max: usize },

    /// A level is not signed by the key holding authority at that point.
    #[error("Invalid signature at delegation level {level}")]
    InvalidSignature { level: usize },
}

/// Why a proof was rejected.
///
/// Variants are listed in the order the rules are checked.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProofValidationError {
    /// The proof carries no stake.
    #[error("no-stake")]
    NoStake,

    /// A stake is worth less than the dust threshold.
    #[error("amount-below-dust-threshold")]
    DustThreshold {
        /// Index of the first offending stake
        index: usize,
        /// Amount of that stake
        amount: Amount,
        /// Configured threshold
        threshold: Amount,
    },

    /// Two stakes spend the same output.
    #[error("duplicated-stake")]
    DuplicatedStake {
        /// Index of the second stake referring to the output
        index: usize,
        /// The shared output
        outpoint: OutPoint,
    },

    /// The proof carries more stakes than allowed.
    #[error("too-many-utxos")]
    TooManyUtxos { count: usize, max: usize },

    /// A stake signature does not verify under the stake's key.
    #[error("invalid-signature")]
    InvalidStakeSignature {
        /// Index of the first offending stake
        index: usize,
    },

    /// The supplied delegation does not hand authority over this proof.
    #[error("delegation-invalid")]
    InvalidDelegation(#[source] DelegationValidationError),
}

impl ProofValidationError {
    /// Stable short name of the broken rule.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoStake => "no-stake",
            Self::DustThreshold { .. } => "amount-below-dust-threshold",
            Self::DuplicatedStake { .. } => "duplicated-stake",
            Self::TooManyUtxos { .. } => "too-many-utxos",
            Self::InvalidStakeSignature { .. } => "invalid-signature",
            Self::InvalidDelegation(_) => "delegation-invalid",
        }
    }

    /// Operator-facing description, as reported when the node refuses to start.
    pub fn startup_message(&self) -> String {
        match self {
            Self::NoStake => "the avalanche proof has no stake".to_string(),
            Self::DustThreshold { .. } => "the avalanche proof stake is too low".to_string(),
            Self::DuplicatedStake { .. } => "the avalanche proof has duplicated stake".to_string(),
            Self::TooManyUtxos { max, .. } => {
                format!("the avalanche proof has too many utxos (max: {max})")
            }
            Self::InvalidStakeSignature { .. } => {
                "the avalanche proof has invalid stake signatures".to_string()
            }
            Self::InvalidDelegation(_) => "the avalanche proof has an invalid delegation".to_string(),
        }
    }
}

impl From<DelegationValidationError> for ProofValidationError {
    fn from(e: DelegationValidationError) -> Self {
        Self::InvalidDelegation(e)
    }
}
