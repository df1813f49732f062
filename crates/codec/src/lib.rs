//! Binary encoding used by proofs and delegations.
//!
//! The format is the ledger's usual little-endian layout: fixed-width integers,
//! compact-size prefixes for counts and variable-length byte strings.
//!
//! ```text
//! value            encoding
//! -----            --------
//! n < 0xfd         [n]
//! n <= 0xffff      [0xfd][u16 LE]
//! n <= 0xffffffff  [0xfe][u32 LE]
//! otherwise        [0xff][u64 LE]
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

mod ext;

pub use ext::{BufExt, BufMutExt};

/// Largest compact-size value accepted when decoding.
///
/// Anything larger cannot describe an in-memory collection we would accept anyway.
pub const MAX_COMPACT_SIZE: u64 = 0x0200_0000;

/// Errors that can occur when decoding a value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended before the value was complete.
    #[error("Unexpected end of input: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Number of bytes the decoder tried to read
        needed: usize,
        /// Number of bytes left in the input
        remaining: usize,
    },

    /// A compact-size integer used a longer encoding than necessary.
    #[error("Non-canonical compact size")]
    NonCanonicalCompactSize,

    /// A length or count exceeds what the decoder allows.
    #[error("Size {size} exceeds the maximum of {max}")]
    SizeTooLarge {
        /// Decoded size
        size: u64,
        /// Maximum allowed size
        max: u64,
    },

    /// Bytes were left over after decoding a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// The bytes are well-formed but do not describe a valid value.
    #[error("Invalid {what}: {reason}")]
    Invalid {
        /// What was being decoded
        what: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl DecodeError {
    /// Shorthand for [`DecodeError::Invalid`].
    pub fn invalid(what: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            what,
            reason: reason.to_string(),
        }
    }
}

impl From<bytes::TryGetError> for DecodeError {
    fn from(e: bytes::TryGetError) -> Self {
        Self::UnexpectedEof {
            needed: e.requested,
            remaining: e.available,
        }
    }
}

/// A value with a canonical binary encoding.
pub trait Encode {
    /// Append the encoding of `self` to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Encode `self` into a freshly allocated buffer.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// A value that can be read back from its canonical binary encoding.
pub trait Decode: Sized {
    /// Read one value from the front of `buf`, advancing it.
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError>;

    /// Decode a value that must span the whole of `bytes`.
    fn decode_exact(mut bytes: &[u8]) -> Result<Self, DecodeError> {
        let value = Self::decode(&mut bytes)?;
        if bytes.has_remaining() {
            return Err(DecodeError::TrailingBytes(bytes.remaining()));
        }
        Ok(value)
    }
}

/// Codec for turning values into bytes and back.
pub trait Codec<T>: Send + Sync + 'static {
    type Error: std::error::Error;

    fn decode(&self, bytes: Bytes) -> Result<T, Self::Error>;
    fn encode(&self, msg: &T) -> Result<Bytes, Self::Error>;
}

/// [`Codec`] for any type with a canonical [`Encode`]/[`Decode`] encoding.
#[derive(Copy, Clone, Debug, Default)]
pub struct BinaryCodec;

impl<T> Codec<T> for BinaryCodec
where
    T: Encode + Decode,
{
    type Error = DecodeError;

    fn decode(&self, bytes: Bytes) -> Result<T, Self::Error> {
        T::decode_exact(&bytes[..])
    }

    fn encode(&self, msg: &T) -> Result<Bytes, Self::Error> {
        let mut buf = BytesMut::new();
        msg.encode(&mut buf);
        Ok(buf.freeze())
    }
}

/// Number of bytes needed to encode `n` as a compact size.
pub fn compact_size_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_compact_size(self.len() as u64);
        for item in self {
            item.encode(buf);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let len = buf.try_get_compact_size()?;

        // Cap the preallocation: the length is attacker controlled.
        let mut items = Vec::with_capacity(len.min(1024) as usize);
        for _ in 0..len {
            items.push(T::decode(buf)?);
        }
        Ok(items)
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        buf.try_get_array()
    }
}
