//! Stakes: UTXO claims and their ownership signatures.

use avaproof_codec::{BufExt, BufMutExt, Decode, DecodeError, Encode};
use avaproof_signing_ecdsa::{PublicKey, Signature, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
use bytes::{Buf, BufMut};

use crate::{Amount, Hash256, HashWriter, OutPoint};

/// Highest confirmation height a stake can carry.
///
/// The height shares a 32-bit field with the coinbase flag.
pub const MAX_STAKE_HEIGHT: u32 = u32::MAX >> 1;

/// A claim over one unspent output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stake {
    /// The output being staked
    pub outpoint: OutPoint,
    /// Value of the output
    pub amount: Amount,
    /// Height of the block that confirmed the output, at most [`MAX_STAKE_HEIGHT`]
    pub height: u32,
    /// Whether the output was created by a coinbase transaction
    pub is_coinbase: bool,
    /// Key that owns the output
    pub pubkey: PublicKey,
}

impl Stake {
    pub fn new(
        outpoint: OutPoint,
        amount: Amount,
        height: u32,
        is_coinbase: bool,
        pubkey: PublicKey,
    ) -> Self {
        Self {
            outpoint,
            amount,
            height,
            is_coinbase,
            pubkey,
        }
    }

    fn height_and_coinbase(&self) -> u32 {
        ((self.height & MAX_STAKE_HEIGHT) << 1) | u32::from(self.is_coinbase)
    }

    /// The digest the owning key signs for this stake inside a given proof.
    ///
    /// Format: `H(sequence || expiration || stake)`
    ///
    /// Where:
    /// - `sequence` is a u64 LE, `expiration` an i64 LE
    /// - `stake` is the canonical encoding of this stake, outpoint first
    /// - `H` is double SHA-256
    ///
    /// Binding the proof's sequence and expiration prevents replaying the
    /// signature into another proof.
    pub fn commitment(&self, sequence: u64, expiration: i64) -> Hash256 {
        let mut writer = HashWriter::new();
        writer
            .write(&sequence.to_le_bytes())
            .write(&expiration.to_le_bytes())
            .write_encoded(self);
        writer.finish()
    }
}

impl Encode for Stake {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.outpoint.encode(buf);
        buf.put_u64_le(self.amount.units());
        buf.put_u32_le(self.height_and_coinbase());
        buf.put_var_bytes(self.pubkey.as_bytes());
    }
}

impl Decode for Stake {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let outpoint = OutPoint::decode(buf)?;
        let amount = Amount::from_units(buf.try_get_u64_le()?);
        let height_and_coinbase = buf.try_get_u32_le()?;
        let pubkey = decode_pubkey(buf)?;

        Ok(Self {
            outpoint,
            amount,
            height: height_and_coinbase >> 1,
            is_coinbase: height_and_coinbase & 1 == 1,
            pubkey,
        })
    }
}

/// A stake together with the owner's signature over its commitment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignedStake {
    /// The stake
    pub stake: Stake,
    /// Signature by `stake.pubkey` over [`Stake::commitment`]
    pub signature: Signature,
}

impl SignedStake {
    pub fn new(stake: Stake, signature: Signature) -> Self {
        Self { stake, signature }
    }

    pub fn outpoint(&self) -> &OutPoint {
        &self.stake.outpoint
    }

    pub fn amount(&self) -> Amount {
        self.stake.amount
    }
}

impl Encode for SignedStake {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.stake.encode(buf);
        buf.put_slice(self.signature.as_bytes());
    }
}

impl Decode for SignedStake {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let stake = Stake::decode(buf)?;
        let signature = Signature::from_bytes(buf.try_get_array::<SIGNATURE_SIZE>()?);
        Ok(Self { stake, signature })
    }
}

/// Read a compact-size prefixed compressed public key.
pub(crate) fn decode_pubkey<B: Buf>(buf: &mut B) -> Result<PublicKey, DecodeError> {
    let bytes = buf.try_get_var_bytes(PUBLIC_KEY_SIZE)?;
    PublicKey::from_bytes(&bytes).map_err(|e| DecodeError::invalid("public key", e))
}
