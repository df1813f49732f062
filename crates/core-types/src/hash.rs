use core::fmt;
use core::str::FromStr;

use avaproof_codec::{Decode, DecodeError, Encode};
use bytes::{Buf, BufMut};
use sha2::{Digest, Sha256};

/// A 256-bit hash.
///
/// Displayed the way the ledger displays block and transaction hashes:
/// as hex of the byte-reversed digest.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The all-zero hash.
    pub const ZERO: Self = Self([0; 32]);

    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes, in hashing order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Double SHA-256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        let mut writer = HashWriter::new();
        writer.write(data);
        writer.finish()
    }

    /// Hex of the byte-reversed digest.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Parse the byte-reversed hex form produced by [`Hash256::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Encode for Hash256 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.0);
    }
}

impl Decode for Hash256 {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        <[u8; 32]>::decode(buf).map(Self)
    }
}

/// Incremental double SHA-256, the ledger's block-hashing convention.
#[derive(Clone, Default)]
pub struct HashWriter(Sha256);

impl HashWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update(bytes);
        self
    }

    /// Feed the canonical encoding of `value`.
    pub fn write_encoded<T: Encode + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.write(&value.encode_to_vec())
    }

    pub fn finish(self) -> Hash256 {
        let first = self.0.finalize();
        Hash256(Sha256::digest(first).into())
    }
}

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Hash256);

        impl $name {
            pub const fn new(hash: Hash256) -> Self {
                Self(hash)
            }

            pub fn hash(&self) -> &Hash256 {
                &self.0
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                self.0.as_bytes()
            }

            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }
        }

        impl From<Hash256> for $name {
            fn from(hash: Hash256) -> Self {
                Self(hash)
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Hash256::from_hex(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl Encode for $name {
            fn encode<B: BufMut>(&self, buf: &mut B) {
                self.0.encode(buf)
            }
        }

        impl Decode for $name {
            fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
                Hash256::decode(buf).map(Self)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hash_newtype!(
    /// Identifier of a transaction on the ledger.
    TxId
);

hash_newtype!(
    /// Identifier of a proof, committing to its master key.
    ///
    /// Changes whenever the stakes or the master key change.
    ProofId
);

hash_newtype!(
    /// Identifier of a proof that does not commit to its master key.
    ///
    /// Delegations reference a proof by this id, so it stays stable
    /// while signing authority moves from key to key.
    LimitedProofId
);
