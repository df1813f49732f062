//! Deciding whether the node may run with its configured proof.
//!
//! Keys and proof encoding are checked when the validator is created. The proof
//! itself is only verified once the ledger is synced, since the stakes cannot
//! be trusted against a partial chain. That check happens exactly once.
//!
//! A verified proof is delegated from its master key to the session key, so
//! the node signs with the session key while the master key stays offline.

use std::sync::Arc;

use avaproof_config::AvalancheConfig;
use avaproof_core_types::{
    DelegateError, Delegation, DelegationBuilder, PrivateKey, Proof, PublicKey,
};
use avaproof_peer::PeerRegistry;
use avaproof_validation::{decode_proof_hex, ProofValidationError, ProofVerifier, VerifiedProof};
use rand::rngs::OsRng;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Conditions that prevent the node from starting.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("the avalanche session key is invalid")]
    InvalidSessionKey,

    #[error("the avalanche master key is missing for the avalanche proof")]
    MissingMasterKey,

    #[error("the avalanche master key is invalid")]
    InvalidMasterKey,

    #[error("the avalanche proof has invalid format")]
    InvalidProofFormat,

    #[error("the avalanche master key does not match the proof")]
    MasterKeyMismatch,

    #[error("{}", .0.startup_message())]
    InvalidProof(ProofValidationError),

    #[error("the avalanche proof could not be delegated to the session key: {0}")]
    Delegation(DelegateError),

    #[error("the ledger sync ended before completion")]
    SyncInterrupted,
}

/// The node's own proof, once verified.
#[derive(Clone, Debug)]
pub struct LocalProof {
    pub proof: Arc<Proof>,
    /// One level from the proof master to the session key
    pub delegation: Delegation,
    /// Verified with `delegation`, the authority is the session key
    pub verified: VerifiedProof,
}

#[derive(Clone, Debug)]
pub enum StartupState {
    /// The ledger is not synced yet, nothing is registered
    Pending,
    /// The proof verified and is registered as the node's own
    Verified(LocalProof),
    /// No proof is configured, the node runs without one
    NoProof,
    /// The proof was rejected once the ledger synced
    Fatal(StartupError),
}

impl StartupState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

#[derive(Clone, Debug)]
struct ConfiguredProof {
    proof: Arc<Proof>,
    master: PrivateKey,
}

#[derive(Debug)]
pub struct StartupValidator {
    verifier: ProofVerifier,
    session_key: PrivateKey,
    configured: Option<ConfiguredProof>,
    state: StartupState,
}

impl StartupValidator {
    /// Check the configured keys and proof encoding.
    ///
    /// A missing session key is replaced by a freshly generated one.
    pub fn from_config(config: &AvalancheConfig) -> Result<Self, StartupError> {
        let session_key = match &config.session_key {
            Some(key) => key
                .parse::<PrivateKey>()
                .map_err(|_| StartupError::InvalidSessionKey)?,
            None => {
                info!("No avalanche session key configured, generating one");
                PrivateKey::generate(OsRng)
            }
        };

        let configured = match &config.proof {
            Some(proof_hex) => Some(Self::load_proof(proof_hex, config.master_key.as_deref())?),
            None => {
                if config.master_key.is_some() {
                    warn!("An avalanche master key is configured without a proof, ignoring it");
                }
                None
            }
        };

        Ok(Self {
            verifier: ProofVerifier::new(config.proof_params()),
            session_key,
            configured,
            state: StartupState::Pending,
        })
    }

    fn load_proof(
        proof_hex: &str,
        master_key: Option<&str>,
    ) -> Result<ConfiguredProof, StartupError> {
        let master = master_key
            .ok_or(StartupError::MissingMasterKey)?
            .parse::<PrivateKey>()
            .map_err(|_| StartupError::InvalidMasterKey)?;

        let proof = decode_proof_hex(proof_hex).map_err(|_| StartupError::InvalidProofFormat)?;

        if master.public_key() != *proof.master() {
            return Err(StartupError::MasterKeyMismatch);
        }

        Ok(ConfiguredProof {
            proof: Arc::new(proof),
            master,
        })
    }

    pub fn state(&self) -> &StartupState {
        &self.state
    }

    /// Key the node signs avalanche messages with.
    pub fn session_key(&self) -> &PrivateKey {
        &self.session_key
    }

    pub fn session_public_key(&self) -> PublicKey {
        self.session_key.public_key()
    }

    /// Public key of the configured proof master, if a proof is configured.
    pub fn master_public_key(&self) -> Option<PublicKey> {
        self.configured.as_ref().map(|c| c.master.public_key())
    }

    /// Leave the pending state, verifying the configured proof.
    ///
    /// Only the first call has an effect; later calls return the state reached.
    pub fn on_ledger_synced(&mut self, registry: &PeerRegistry) -> &StartupState {
        if !self.state.is_pending() {
            return &self.state;
        }

        self.state = match &self.configured {
            None => {
                info!("Ledger synced, running without an avalanche proof");
                StartupState::NoProof
            }

            Some(configured) => match self.delegate_to_session(configured) {
                Ok(local) => {
                    registry.register_local(Arc::clone(&local.proof));
                    info!(
                        proof_id = %local.verified.proof_id,
                        delegation_id = %local.delegation.id(),
                        "Ledger synced, avalanche proof verified"
                    );

                    StartupState::Verified(local)
                }

                Err(e) => {
                    error!("{e}");
                    StartupState::Fatal(e)
                }
            },
        };

        &self.state
    }

    /// Verify the proof, then hand its authority over to the session key.
    fn delegate_to_session(&self, configured: &ConfiguredProof) -> Result<LocalProof, StartupError> {
        let proof = &configured.proof;
        self.verifier.verify(proof).map_err(StartupError::InvalidProof)?;

        let mut builder =
            DelegationBuilder::from_proof(proof, self.verifier.params().max_delegation_levels);
        builder
            .add_level(&configured.master, self.session_key.public_key())
            .map_err(StartupError::Delegation)?;
        let delegation = builder.build();

        let verified = self
            .verifier
            .verify_with_delegation(proof, Some(&delegation))
            .map_err(StartupError::InvalidProof)?;

        Ok(LocalProof {
            proof: Arc::clone(proof),
            delegation,
            verified,
        })
    }

    /// Wait for the ledger to report it is synced, then leave the pending state.
    ///
    /// Returns the verified local proof, if any.
    pub async fn run(
        &mut self,
        mut synced: watch::Receiver<bool>,
        registry: &PeerRegistry,
    ) -> Result<Option<&LocalProof>, StartupError> {
        if synced.wait_for(|synced| *synced).await.is_err() {
            error!("Ledger sync notifier dropped before the ledger synced");
            return Err(StartupError::SyncInterrupted);
        }

        match self.on_ledger_synced(registry) {
            StartupState::Verified(local) => Ok(Some(local)),
            StartupState::Fatal(e) => Err(e.clone()),
            StartupState::Pending | StartupState::NoProof => Ok(None),
        }
    }
}
