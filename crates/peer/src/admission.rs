use std::sync::Arc;

use avaproof_core_types::{Delegation, Proof, PublicKey};
use avaproof_validation::{ProofValidationError, ProofVerifier, VerifiedProof};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{NodeId, PeerRegistry};

/// Why a peer was not admitted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The proof, or its delegation, failed verification.
    #[error("The proof is invalid: {0}")]
    InvalidProof(#[from] ProofValidationError),

    /// The peer's key is not the one entitled to sign for the proof.
    #[error("The peer key {claimed} does not match the proof authority {authority}")]
    KeyMismatch {
        claimed: PublicKey,
        authority: PublicKey,
    },
}

/// Admits peers whose proof verifies and whose key holds authority over it.
///
/// Without a delegation the peer must present the proof master key. With one,
/// it must present the delegation's terminal key. Rejections leave the
/// registry untouched.
#[derive(Clone, Debug)]
pub struct AdmissionGate {
    verifier: ProofVerifier,
    registry: PeerRegistry,
}

impl AdmissionGate {
    pub fn new(verifier: ProofVerifier, registry: PeerRegistry) -> Self {
        Self { verifier, registry }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn verifier(&self) -> &ProofVerifier {
        &self.verifier
    }

    /// Verify and register a peer. A node already bound to another proof is rebound.
    pub fn admit(
        &self,
        node: NodeId,
        claimed: &PublicKey,
        proof: Arc<Proof>,
        delegation: Option<&Delegation>,
    ) -> Result<VerifiedProof, AdmissionError> {
        let verified = self
            .verifier
            .verify_with_delegation(&proof, delegation)
            .inspect_err(|e| {
                warn!(%node, proof_id = %proof.id(), reason = e.reason(), "Peer rejected");
            })?;

        if verified.authority != *claimed {
            warn!(%node, proof_id = %verified.proof_id, %claimed, "Peer rejected: key mismatch");

            return Err(AdmissionError::KeyMismatch {
                claimed: *claimed,
                authority: verified.authority,
            });
        }

        self.registry.upsert(node, &verified, proof);
        debug!(%node, proof_id = %verified.proof_id, "Peer admitted");

        Ok(verified)
    }
}
