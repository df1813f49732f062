use avaproof_codec::{BufExt, BufMutExt, Decode, DecodeError, Encode};
use avaproof_signing_ecdsa::{PublicKey, Signature, SIGNATURE_SIZE};
use bytes::{Buf, BufMut};

use crate::stake::decode_pubkey;
use crate::{Hash256, HashWriter, LimitedProofId};

/// Identifier of a delegation: the digest signed by its last level.
pub type DelegationId = Hash256;

/// One step of a delegation chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DelegationLevel {
    /// Key receiving the signing authority at this level
    pub pubkey: PublicKey,
    /// Signature by the previous level's key (the proof master for level 0)
    /// over [`Delegation::level_digest`]
    pub signature: Signature,
}

impl DelegationLevel {
    pub fn new(pubkey: PublicKey, signature: Signature) -> Self {
        Self { pubkey, signature }
    }
}

impl Encode for DelegationLevel {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_var_bytes(self.pubkey.as_bytes());
        buf.put_slice(self.signature.as_bytes());
    }
}

impl Decode for DelegationLevel {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let pubkey = decode_pubkey(buf)?;
        let signature = Signature::from_bytes(buf.try_get_array::<SIGNATURE_SIZE>()?);
        Ok(Self { pubkey, signature })
    }
}

/// A chain of signatures moving a proof's signing authority away from its master key.
///
/// The chain is rooted at the limited id so that it keeps referring to the same
/// stakes regardless of which key currently holds authority. Each level's signed
/// digest commits to the previous digest, which ties every level to its position.
///
/// ```text
/// d[-1] = limited id
/// d[i]  = H(d[i-1] || pubkey[i])       signed by pubkey[i-1], or the master for i = 0
/// id    = d[n-1]
/// ```
///
/// A delegation with no levels is a placeholder and never verifies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delegation {
    limited_id: LimitedProofId,
    levels: Vec<DelegationLevel>,
}

impl Delegation {
    pub fn new(limited_id: LimitedProofId, levels: Vec<DelegationLevel>) -> Self {
        Self { limited_id, levels }
    }

    /// Limited id of the delegated proof.
    pub fn limited_id(&self) -> &LimitedProofId {
        &self.limited_id
    }

    pub fn levels(&self) -> &[DelegationLevel] {
        &self.levels
    }

    pub fn into_levels(self) -> Vec<DelegationLevel> {
        self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The key holding authority at the end of the chain, if any level exists.
    ///
    /// Whether that key legitimately holds authority is only known after verification.
    pub fn terminal_key(&self) -> Option<&PublicKey> {
        self.levels.last().map(|level| &level.pubkey)
    }

    /// Digest signed for a level delegating to `pubkey`, given the previous level's digest.
    pub fn level_digest(previous: &Hash256, pubkey: &PublicKey) -> Hash256 {
        let mut key_bytes = Vec::with_capacity(34);
        key_bytes.put_var_bytes(pubkey.as_bytes());

        let mut writer = HashWriter::new();
        writer.write(previous.as_bytes()).write(&key_bytes);
        writer.finish()
    }

    /// The digests each level signs, in chain order.
    pub fn level_digests(&self) -> Vec<Hash256> {
        let mut previous = *self.limited_id.hash();
        self.levels
            .iter()
            .map(|level| {
                previous = Self::level_digest(&previous, &level.pubkey);
                previous
            })
            .collect()
    }

    /// Digest committed to by the whole chain.
    ///
    /// For an empty delegation this is the limited id itself.
    pub fn id(&self) -> DelegationId {
        self.levels
            .iter()
            .fold(*self.limited_id.hash(), |previous, level| {
                Self::level_digest(&previous, &level.pubkey)
            })
    }
}

impl Encode for Delegation {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.limited_id.encode(buf);
        self.levels.encode(buf);
    }
}

impl Decode for Delegation {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let limited_id = LimitedProofId::decode(buf)?;
        let levels = Vec::<DelegationLevel>::decode(buf)?;
        Ok(Self { limited_id, levels })
    }
}
