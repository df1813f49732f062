use std::sync::Arc;

use avaproof_codec::Encode;
use avaproof_core_types::{
    Amount, DelegationBuilder, OutPoint, PrivateKey, Proof, ProofBuilder, ProofId, ProofParams,
    PublicKey, StakeClaim, TxId,
};
use avaproof_peer::{AdmissionError, AdmissionGate, NodeId, PeerRegistry};
use avaproof_validation::{
    decode_delegation_hex, decode_proof_hex, verify_delegation, CoinView, ProofVerifier,
    StakeValidator,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::view::{DecodedDelegation, DecodedProof, PeerInfo};
use crate::NodeError;

/// One stake to include in a new proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRequest {
    /// Transaction id, as displayed by the ledger
    pub txid: String,
    pub vout: u32,
    /// Amount in units
    pub amount: u64,
    pub height: u32,
    pub iscoinbase: bool,
    /// Key owning the output, as WIF or hex
    pub privatekey: String,
}

impl StakeRequest {
    fn to_claim(&self) -> Result<StakeClaim, NodeError> {
        let txid: TxId = self.txid.parse().map_err(|_| {
            NodeError::InvalidParameter(format!("txid must be a 32-byte hex string: {}", self.txid))
        })?;

        let private_key: PrivateKey = self
            .privatekey
            .parse()
            .map_err(|_| NodeError::InvalidPrivateKey)?;

        Ok(StakeClaim::new(
            OutPoint::new(txid, self.vout),
            Amount::from_units(self.amount),
            self.height,
            self.iscoinbase,
            private_key,
        ))
    }
}

/// String-in, string-out proof operations.
///
/// Holds the admissibility parameters, the peer registry and, optionally, a view
/// of the ledger used to sanity check stakes at build time.
#[derive(Clone)]
pub struct ProofService {
    gate: AdmissionGate,
    ledger: Option<Arc<dyn CoinView + Send + Sync>>,
}

impl ProofService {
    pub fn new(params: ProofParams, registry: PeerRegistry) -> Self {
        Self {
            gate: AdmissionGate::new(ProofVerifier::new(params), registry),
            ledger: None,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn CoinView + Send + Sync>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn registry(&self) -> &PeerRegistry {
        self.gate.registry()
    }

    pub fn params(&self) -> &ProofParams {
        self.verifier().params()
    }

    fn verifier(&self) -> &ProofVerifier {
        self.gate.verifier()
    }

    fn parse_proof(proof_hex: &str) -> Result<Proof, NodeError> {
        decode_proof_hex(proof_hex).map_err(NodeError::from_proof_format)
    }

    /// Sign the stakes and return the hex-encoded proof.
    ///
    /// Stakes that disagree with the ledger are reported in the logs but still
    /// included: such a proof will fail to verify once checked against the ledger.
    pub fn build(
        &self,
        sequence: u64,
        expiration: i64,
        master: &str,
        stakes: &[StakeRequest],
    ) -> Result<String, NodeError> {
        let master = PublicKey::from_hex(master).map_err(|_| NodeError::InvalidPublicKey)?;

        let claims = stakes
            .iter()
            .map(StakeRequest::to_claim)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(ledger) = &self.ledger {
            let issues = StakeValidator::new(&**ledger).check(&claims);
            if !issues.is_empty() {
                warn!(
                    count = issues.len(),
                    "Building a proof with stakes the ledger does not confirm"
                );
            }
        }

        let proof = ProofBuilder::new(sequence, expiration, master)
            .with_stakes(claims)
            .build()?;

        debug!(proof_id = %proof.id(), stakes = proof.stakes().len(), "Proof built");
        Ok(hex::encode(proof.encode_to_vec()))
    }

    pub fn decode(&self, proof_hex: &str) -> Result<DecodedProof, NodeError> {
        let proof = Self::parse_proof(proof_hex)?;
        Ok(DecodedProof::from(&proof))
    }

    /// Returns `true` if the proof verifies, or the reason it does not.
    pub fn verify(&self, proof_hex: &str) -> Result<bool, NodeError> {
        let proof = Self::parse_proof(proof_hex)?;

        self.verifier()
            .verify(&proof)
            .map(|_| true)
            .map_err(NodeError::ProofRejected)
    }

    /// Append a level delegating the proof's authority to `delegate`.
    ///
    /// Without `prior`, `private_key` must be the proof master. With it, the
    /// prior delegation must verify against the proof and `private_key` must be
    /// its terminal key.
    pub fn delegate(
        &self,
        proof_hex: &str,
        private_key: &str,
        delegate: &str,
        prior: Option<&str>,
    ) -> Result<String, NodeError> {
        let proof = Self::parse_proof(proof_hex)?;

        self.verifier()
            .verify(&proof)
            .map_err(|_| NodeError::InvalidProof)?;

        let signer: PrivateKey = private_key
            .parse()
            .map_err(|_| NodeError::InvalidPrivateKey)?;

        let delegate = PublicKey::from_hex(delegate).map_err(|_| NodeError::InvalidPublicKey)?;

        let max_levels = self.params().max_delegation_levels;

        let mut builder = match prior {
            None => DelegationBuilder::from_proof(&proof, max_levels),
            Some(prior) => {
                let prior =
                    decode_delegation_hex(prior).map_err(|_| NodeError::InvalidDelegation)?;

                let authority = verify_delegation(&prior, &proof, self.params())
                    .map_err(|_| NodeError::InvalidDelegation)?;

                DelegationBuilder::from_delegation(prior, authority, max_levels)
            }
        };

        builder.add_level(&signer, delegate)?;
        let delegation = builder.build();

        debug!(
            proof_id = %proof.id(),
            delegation_id = %delegation.id(),
            depth = delegation.levels().len(),
            "Delegation extended"
        );

        Ok(hex::encode(delegation.encode_to_vec()))
    }

    pub fn decode_delegation(&self, delegation_hex: &str) -> Result<DecodedDelegation, NodeError> {
        let delegation =
            decode_delegation_hex(delegation_hex).map_err(NodeError::from_delegation_format)?;

        Ok(DecodedDelegation::from(&delegation))
    }

    /// Returns `true` if the proof verifies and the delegation hands authority over it.
    pub fn verify_delegation(
        &self,
        proof_hex: &str,
        delegation_hex: &str,
    ) -> Result<bool, NodeError> {
        let proof = Self::parse_proof(proof_hex)?;
        let delegation =
            decode_delegation_hex(delegation_hex).map_err(NodeError::from_delegation_format)?;

        self.verifier()
            .verify(&proof)
            .map_err(NodeError::ProofRejected)?;

        verify_delegation(&delegation, &proof, self.params())
            .map(|_| true)
            .map_err(|_| NodeError::InvalidDelegation)
    }

    /// Verify a peer's proof and key, and register the peer if they check out.
    ///
    /// Malformed inputs are errors. A proof that parses but is rejected, or a
    /// key that does not hold authority over it, yields `false`.
    pub fn admit(
        &self,
        node: NodeId,
        claimed: &str,
        proof_hex: &str,
        delegation_hex: Option<&str>,
    ) -> Result<bool, NodeError> {
        let claimed = PublicKey::from_hex(claimed).map_err(|_| NodeError::InvalidPublicKey)?;
        let proof = Self::parse_proof(proof_hex)?;

        let delegation = delegation_hex
            .map(decode_delegation_hex)
            .transpose()
            .map_err(NodeError::from_delegation_format)?;

        match self
            .gate
            .admit(node, &claimed, Arc::new(proof), delegation.as_ref())
        {
            Ok(_) => Ok(true),
            Err(AdmissionError::InvalidProof(_) | AdmissionError::KeyMismatch { .. }) => Ok(false),
        }
    }

    /// Registered proofs with the nodes bound to them.
    pub fn peer_info(&self) -> Vec<PeerInfo> {
        self.registry()
            .snapshot()
            .iter()
            .map(PeerInfo::from)
            .collect()
    }

    /// Forget a disconnected node. Returns whether it was registered.
    pub fn disconnect(&self, node: NodeId) -> bool {
        self.registry().remove_node(&node).is_some()
    }

    /// Drop a proof and all nodes bound to it. Returns whether it was registered.
    pub fn evict(&self, proof_id: &str) -> Result<bool, NodeError> {
        let proof_id: ProofId = proof_id.parse().map_err(|_| {
            NodeError::InvalidParameter(format!("proofid must be a 32-byte hex string: {proof_id}"))
        })?;

        Ok(self.registry().evict_proof(&proof_id).is_some())
    }
}
