use avaproof_codec::{BinaryCodec, Codec, Decode, DecodeError, Encode};
use avaproof_core_types::{Delegation, Proof};
use bytes::Bytes;
use thiserror::Error;

/// A serialized proof or delegation could not be read.
///
/// Kept apart from the semantic rules: a value that does not parse is never
/// given a rejection reason.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FormatError {
    #[error("Not a hexadecimal string: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid structure: {0}")]
    Structure(#[from] DecodeError),
}

impl FormatError {
    pub fn is_hex(&self) -> bool {
        matches!(self, Self::Hex(_))
    }
}

fn decode_hex<T: Encode + Decode>(s: &str) -> Result<T, FormatError> {
    let bytes = Bytes::from(hex::decode(s.trim())?);
    Ok(<BinaryCodec as Codec<T>>::decode(&BinaryCodec, bytes)?)
}

/// Hex-decode then deserialize a proof. Trailing bytes are a structure error.
pub fn decode_proof_hex(s: &str) -> Result<Proof, FormatError> {
    decode_hex(s)
}

pub fn decode_delegation_hex(s: &str) -> Result<Delegation, FormatError> {
    decode_hex(s)
}
