use avaproof_core_types::{Delegation, Proof, ProofParams, PublicKey};
use tracing::trace;

use crate::DelegationValidationError;

/// Walk a delegation chain and return the key holding authority at its end.
///
/// Authority starts at the proof's master key. Each level must be signed by
/// the current authority over its level digest, then hands authority to the
/// level's key. The walk stops at the first bad level.
pub fn verify_delegation(
    delegation: &Delegation,
    proof: &Proof,
    params: &ProofParams,
) -> Result<PublicKey, DelegationValidationError> {
    if delegation.limited_id() != proof.limited_id() {
        return Err(DelegationValidationError::ProofMismatch {
            expected: *proof.limited_id(),
            actual: *delegation.limited_id(),
        });
    }

    if delegation.is_empty() {
        return Err(DelegationValidationError::Empty);
    }

    let levels = delegation.levels();
    if levels.len() > params.max_delegation_levels {
        return Err(DelegationValidationError::TooManyLevels {
            levels: levels.len(),
            max: params.max_delegation_levels,
        });
    }

    let mut authority = *proof.master();
    let mut digest = *delegation.limited_id().hash();

    for (level, step) in levels.iter().enumerate() {
        digest = Delegation::level_digest(&digest, &step.pubkey);

        if authority
            .verify_prehash(digest.as_bytes(), &step.signature)
            .is_err()
        {
            return Err(DelegationValidationError::InvalidSignature { level });
        }

        trace!(level, from = %authority, to = %step.pubkey, "Delegation level verified");
        authority = step.pubkey;
    }

    Ok(authority)
}
