use core::fmt;

use crate::{SignatureError, SIGNATURE_SIZE};

/// A compact `r || s` ECDSA signature.
///
/// Stored as raw bytes: a proof can carry any 64 bytes in a signature slot,
/// whether they form a valid scalar pair is only decided at verification time.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; SIGNATURE_SIZE] {
        self.0
    }

    pub(crate) fn to_k256(self) -> Result<k256::ecdsa::Signature, SignatureError> {
        k256::ecdsa::Signature::from_slice(&self.0).map_err(|_| SignatureError::Malformed)
    }
}

impl From<k256::ecdsa::Signature> for Signature {
    fn from(signature: k256::ecdsa::Signature) -> Self {
        let mut bytes = [0; SIGNATURE_SIZE];
        bytes.copy_from_slice(&signature.to_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

#[cfg(feature = "serde")]
mod _serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Signature, SIGNATURE_SIZE};

    impl Serialize for Signature {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&hex::encode(self.0))
        }
    }

    impl<'de> Deserialize<'de> for Signature {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
            let bytes: [u8; SIGNATURE_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
                serde::de::Error::invalid_length(b.len(), &"64 signature bytes")
            })?;
            Ok(Signature(bytes))
        }
    }
}
