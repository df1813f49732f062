use std::collections::BTreeSet;

use avaproof_core_types::{
    Delegation, LimitedProofId, Proof, ProofId, ProofParams, PublicKey, SignedStake,
};
use tracing::debug;

use crate::{verify_delegation, ProofValidationError};

/// Outcome of a successful verification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VerifiedProof {
    pub proof_id: ProofId,
    pub limited_id: LimitedProofId,
    /// Key entitled to sign on behalf of the proof: the terminal key of the
    /// delegation if one was supplied, the master key otherwise
    pub authority: PublicKey,
}

/// Applies the proof admissibility rules under a fixed set of parameters.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProofVerifier {
    params: ProofParams,
}

impl ProofVerifier {
    pub fn new(params: ProofParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ProofParams {
        &self.params
    }

    /// Check a proof on its own.
    pub fn verify(&self, proof: &Proof) -> Result<VerifiedProof, ProofValidationError> {
        self.verify_with_delegation(proof, None)
    }

    /// Check a proof and, if given, the delegation presented with it.
    ///
    /// Rules, in order:
    /// 1. the proof has at least one stake
    /// 2. every stake reaches the dust threshold
    /// 3. no two stakes share an outpoint
    /// 4. the stake count is within bounds
    /// 5. every stake signature verifies
    /// 6. the delegation refers to this proof and verifies end to end
    pub fn verify_with_delegation(
        &self,
        proof: &Proof,
        delegation: Option<&Delegation>,
    ) -> Result<VerifiedProof, ProofValidationError> {
        let result = self.check(proof, delegation);

        match &result {
            Ok(verified) => {
                debug!(proof_id = %verified.proof_id, authority = %verified.authority, "Proof verified")
            }
            Err(e) => debug!(proof_id = %proof.id(), reason = e.reason(), "Proof rejected: {e:?}"),
        }

        result
    }

    fn check(
        &self,
        proof: &Proof,
        delegation: Option<&Delegation>,
    ) -> Result<VerifiedProof, ProofValidationError> {
        let stakes = proof.stakes();

        if stakes.is_empty() {
            return Err(ProofValidationError::NoStake);
        }

        self.check_dust(stakes)?;
        check_duplicates(stakes)?;

        if stakes.len() > self.params.max_stakes {
            return Err(ProofValidationError::TooManyUtxos {
                count: stakes.len(),
                max: self.params.max_stakes,
            });
        }

        check_signatures(proof)?;

        let authority = match delegation {
            Some(delegation) => verify_delegation(delegation, proof, &self.params)?,
            None => *proof.master(),
        };

        Ok(VerifiedProof {
            proof_id: *proof.id(),
            limited_id: *proof.limited_id(),
            authority,
        })
    }

    fn check_dust(&self, stakes: &[SignedStake]) -> Result<(), ProofValidationError> {
        let threshold = self.params.dust_threshold;

        match stakes.iter().position(|s| s.amount() < threshold) {
            Some(index) => Err(ProofValidationError::DustThreshold {
                index,
                amount: stakes[index].amount(),
                threshold,
            }),
            None => Ok(()),
        }
    }
}

fn check_duplicates(stakes: &[SignedStake]) -> Result<(), ProofValidationError> {
    let mut seen = BTreeSet::new();

    for (index, signed) in stakes.iter().enumerate() {
        if !seen.insert(signed.outpoint()) {
            return Err(ProofValidationError::DuplicatedStake {
                index,
                outpoint: *signed.outpoint(),
            });
        }
    }

    Ok(())
}

fn check_signatures(proof: &Proof) -> Result<(), ProofValidationError> {
    for (index, signed) in proof.stakes().iter().enumerate() {
        let commitment = signed
            .stake
            .commitment(proof.sequence(), proof.expiration());

        signed
            .stake
            .pubkey
            .verify_prehash(commitment.as_bytes(), &signed.signature)
            .map_err(|_| ProofValidationError::InvalidStakeSignature { index })?;
    }

    Ok(())
}

/// Check a proof under `params`, without delegation.
pub fn verify_proof(
    proof: &Proof,
    params: &ProofParams,
) -> Result<VerifiedProof, ProofValidationError> {
    ProofVerifier::new(*params).verify(proof)
}
