//! Construction of proofs and delegations.

use avaproof_signing_ecdsa::{PrivateKey, PublicKey, SignatureError};
use thiserror::Error;
use tracing::debug;

use crate::{
    Amount, Delegation, DelegationLevel, Hash256, LimitedProofId, OutPoint, Proof, SignedStake,
    Stake, MAX_STAKE_HEIGHT,
};

/// Errors that can occur while building a proof.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No signing key was supplied for a stake.
    #[error("Missing signing key for stake #{index} ({outpoint})")]
    MissingKey { index: usize, outpoint: OutPoint },

    /// A stake's confirmation height does not fit the encoding.
    #[error("Height {height} of stake #{index} does not fit in 31 bits")]
    HeightOutOfRange { index: usize, height: u32 },

    #[error("Failed to sign stake #{index}: {source}")]
    Signing {
        index: usize,
        source: SignatureError,
    },
}

/// Errors that can occur while appending a delegation level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DelegateError {
    /// The signing key is not the key currently holding authority over the proof.
    #[error("The private key does not match the proof or the delegation (expected {expected})")]
    AuthorityMismatch { expected: PublicKey },

    /// The chain already has the maximum number of levels.
    #[error("The delegation already has {max} levels")]
    TooManyLevels { max: usize },

    #[error("Failed to sign delegation level: {0}")]
    Signing(#[from] SignatureError),
}

/// A UTXO claim to be staked, along with the key that owns it.
#[derive(Clone, Debug)]
pub struct StakeClaim {
    pub outpoint: OutPoint,
    pub amount: Amount,
    pub height: u32,
    pub is_coinbase: bool,
    /// Key owning the output. Building fails if it is absent.
    pub private_key: Option<PrivateKey>,
}

impl StakeClaim {
    pub fn new(
        outpoint: OutPoint,
        amount: Amount,
        height: u32,
        is_coinbase: bool,
        private_key: PrivateKey,
    ) -> Self {
        Self {
            outpoint,
            amount,
            height,
            is_coinbase,
            private_key: Some(private_key),
        }
    }
}

/// Builds and signs a [`Proof`].
#[derive(Clone, Debug)]
pub struct ProofBuilder {
    sequence: u64,
    expiration: i64,
    master: PublicKey,
    claims: Vec<StakeClaim>,
}

impl ProofBuilder {
    pub fn new(sequence: u64, expiration: i64, master: PublicKey) -> Self {
        Self {
            sequence,
            expiration,
            master,
            claims: Vec::new(),
        }
    }

    pub fn with_stake(mut self, claim: StakeClaim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn with_stakes(mut self, claims: impl IntoIterator<Item = StakeClaim>) -> Self {
        self.claims.extend(claims);
        self
    }

    /// Sign every stake and assemble the proof.
    ///
    /// Claims over a zero amount carry no stake and are left out of the proof.
    /// An empty stake set still builds, but the resulting proof never verifies.
    pub fn build(self) -> Result<Proof, BuildError> {
        let mut stakes = Vec::with_capacity(self.claims.len());

        for (index, claim) in self.claims.into_iter().enumerate() {
            if claim.amount.is_zero() {
                debug!(%claim.outpoint, "Skipping zero-amount stake");
                continue;
            }

            if claim.height > MAX_STAKE_HEIGHT {
                return Err(BuildError::HeightOutOfRange {
                    index,
                    height: claim.height,
                });
            }

            let Some(private_key) = claim.private_key else {
                return Err(BuildError::MissingKey {
                    index,
                    outpoint: claim.outpoint,
                });
            };

            let stake = Stake::new(
                claim.outpoint,
                claim.amount,
                claim.height,
                claim.is_coinbase,
                private_key.public_key(),
            );

            let commitment = stake.commitment(self.sequence, self.expiration);
            let signature = private_key
                .sign_prehash(commitment.as_bytes())
                .map_err(|source| BuildError::Signing { index, source })?;

            stakes.push(SignedStake::new(stake, signature));
        }

        Ok(Proof::new(
            self.sequence,
            self.expiration,
            self.master,
            stakes,
        ))
    }
}

/// Appends levels to a delegation chain.
///
/// Tracks the key currently holding authority and the digest of the last level,
/// so that each new level can be signed without re-walking the chain.
#[derive(Clone, Debug)]
pub struct DelegationBuilder {
    limited_id: LimitedProofId,
    authority: PublicKey,
    last_digest: Hash256,
    levels: Vec<DelegationLevel>,
    max_levels: usize,
}

impl DelegationBuilder {
    /// Start a fresh chain for `proof`, with its master key holding authority.
    pub fn from_proof(proof: &Proof, max_levels: usize) -> Self {
        Self {
            limited_id: *proof.limited_id(),
            authority: *proof.master(),
            last_digest: *proof.limited_id().hash(),
            levels: Vec::new(),
            max_levels,
        }
    }

    /// Continue an existing chain whose terminal key is `authority`.
    ///
    /// The chain must already have been verified against its proof:
    /// `authority` is trusted as the key holding authority.
    pub fn from_delegation(delegation: Delegation, authority: PublicKey, max_levels: usize) -> Self {
        Self {
            limited_id: *delegation.limited_id(),
            authority,
            last_digest: delegation.id(),
            levels: delegation.into_levels(),
            max_levels,
        }
    }

    /// The key that must sign the next level.
    pub fn authority(&self) -> &PublicKey {
        &self.authority
    }

    /// Delegate authority to `delegate`, signing with the current authority's key.
    pub fn add_level(
        &mut self,
        signer: &PrivateKey,
        delegate: PublicKey,
    ) -> Result<&mut Self, DelegateError> {
        if signer.public_key() != self.authority {
            return Err(DelegateError::AuthorityMismatch {
                expected: self.authority,
            });
        }

        if self.levels.len() >= self.max_levels {
            return Err(DelegateError::TooManyLevels {
                max: self.max_levels,
            });
        }

        let digest = Delegation::level_digest(&self.last_digest, &delegate);
        let signature = signer.sign_prehash(digest.as_bytes())?;

        self.levels.push(DelegationLevel::new(delegate, signature));
        self.last_digest = digest;
        self.authority = delegate;

        Ok(self)
    }

    pub fn build(self) -> Delegation {
        Delegation::new(self.limited_id, self.levels)
    }
}
