use core::fmt;
use core::str::FromStr;

use k256::ecdsa::SigningKey;
use signature::hazmat::PrehashSigner;

use crate::{wif, KeyError, PublicKey, Signature, SignatureError, WifNetwork, PRIVATE_KEY_SIZE};

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Generate a new random private key.
    #[cfg(feature = "rand")]
    pub fn generate<R>(mut rng: R) -> Self
    where
        R: rand::RngCore + rand::CryptoRng,
    {
        Self(SigningKey::random(&mut rng))
    }

    /// Parse a raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(KeyError::InvalidLength {
                expected: PRIVATE_KEY_SIZE,
                actual: bytes.len(),
            });
        }

        SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidPrivateKey)
    }

    /// Parse a hex-encoded 32-byte scalar.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a private key in wallet import format.
    ///
    /// Only compressed-key WIF strings are accepted since proofs carry compressed public keys.
    pub fn from_wif(s: &str) -> Result<Self, KeyError> {
        let (_, bytes) = wif::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Encode this key in wallet import format.
    pub fn to_wif(&self, network: WifNetwork) -> String {
        wif::encode(network, &self.to_bytes())
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.0.to_bytes().into()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(self.0.verifying_key())
    }

    /// Sign a 32-byte message digest.
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<Signature, SignatureError> {
        let signature: k256::ecdsa::Signature = self
            .0
            .sign_prehash(digest)
            .map_err(|e| SignatureError::Signing(e.to_string()))?;

        Ok(Signature::from(signature))
    }
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    /// Accepts either 64 hex characters or a WIF string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == PRIVATE_KEY_SIZE * 2 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(s)
        } else {
            Self::from_wif(s)
        }
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey")
            .field(&self.public_key())
            .finish()
    }
}
