use avaproof_codec::{BufMutExt, Decode, DecodeError, Encode};
use avaproof_signing_ecdsa::PublicKey;
use bytes::{Buf, BufMut};

use crate::stake::decode_pubkey;
use crate::{Amount, HashWriter, LimitedProofId, ProofId, SignedStake};

/// A signed bundle of stakes proving control over the staked outputs.
///
/// Immutable once built: both identifiers are computed on construction.
///
/// # Encoding
///
/// ```text
/// +------------+------------+--------------+-------------+----------+-----+----------+
/// |  Sequence  | Expiration |  Master key  | Stake count | Stake #1 | ... | Stake #n |
/// |  (u64 LE)  |  (i64 LE)  | (var bytes)  | (compact)   |          |     |          |
/// +------------+------------+--------------+-------------+----------+-----+----------+
/// ```
///
/// Each stake is `txid || vout || amount || (height << 1 | coinbase) || pubkey || signature`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    sequence: u64,
    expiration: i64,
    master: PublicKey,
    stakes: Vec<SignedStake>,
    limited_id: LimitedProofId,
    proof_id: ProofId,
}

impl Proof {
    /// Assemble a proof and compute its identifiers.
    ///
    /// No validation happens here, see the validation crate for the admissibility rules.
    pub fn new(sequence: u64, expiration: i64, master: PublicKey, stakes: Vec<SignedStake>) -> Self {
        let limited_id = Self::compute_limited_id(sequence, expiration, &stakes);
        let proof_id = Self::compute_proof_id(sequence, expiration, &master, &limited_id);

        Self {
            sequence,
            expiration,
            master,
            stakes,
            limited_id,
            proof_id,
        }
    }

    /// `H(sequence || expiration || stake count || stakes)`, stake signatures excluded.
    pub fn compute_limited_id(
        sequence: u64,
        expiration: i64,
        stakes: &[SignedStake],
    ) -> LimitedProofId {
        let mut writer = HashWriter::new();
        writer
            .write(&sequence.to_le_bytes())
            .write(&expiration.to_le_bytes());

        let mut count = Vec::with_capacity(9);
        count.put_compact_size(stakes.len() as u64);
        writer.write(&count);

        for signed in stakes {
            writer.write_encoded(&signed.stake);
        }

        LimitedProofId::new(writer.finish())
    }

    /// `H(sequence || expiration || master || limited id)`.
    pub fn compute_proof_id(
        sequence: u64,
        expiration: i64,
        master: &PublicKey,
        limited_id: &LimitedProofId,
    ) -> ProofId {
        let mut master_bytes = Vec::with_capacity(34);
        master_bytes.put_var_bytes(master.as_bytes());

        let mut writer = HashWriter::new();
        writer
            .write(&sequence.to_le_bytes())
            .write(&expiration.to_le_bytes())
            .write(&master_bytes)
            .write(limited_id.as_bytes());

        ProofId::new(writer.finish())
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Timestamp after which the proof is no longer meant to be used.
    pub fn expiration(&self) -> i64 {
        self.expiration
    }

    pub fn master(&self) -> &PublicKey {
        &self.master
    }

    pub fn stakes(&self) -> &[SignedStake] {
        &self.stakes
    }

    pub fn limited_id(&self) -> &LimitedProofId {
        &self.limited_id
    }

    pub fn id(&self) -> &ProofId {
        &self.proof_id
    }

    /// Sum of all stake amounts.
    pub fn staked_amount(&self) -> Amount {
        self.stakes.iter().map(SignedStake::amount).sum()
    }
}

impl Encode for Proof {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64_le(self.sequence);
        buf.put_i64_le(self.expiration);
        buf.put_var_bytes(self.master.as_bytes());
        self.stakes.encode(buf);
    }
}

impl Decode for Proof {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let sequence = buf.try_get_u64_le()?;
        let expiration = buf.try_get_i64_le()?;
        let master = decode_pubkey(buf)?;
        let stakes = Vec::<SignedStake>::decode(buf)?;

        Ok(Self::new(sequence, expiration, master, stakes))
    }
}
