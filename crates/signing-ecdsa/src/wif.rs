//! Wallet import format: `base58check(version || key || 0x01)`.

use crate::{KeyError, PRIVATE_KEY_SIZE};

const COMPRESSED_FLAG: u8 = 0x01;

/// Network a WIF string was encoded for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WifNetwork {
    Mainnet,
    Testnet,
}

impl WifNetwork {
    pub const fn version(self) -> u8 {
        match self {
            Self::Mainnet => 0x80,
            Self::Testnet => 0xef,
        }
    }

    fn from_version(version: u8) -> Option<Self> {
        match version {
            0x80 => Some(Self::Mainnet),
            0xef => Some(Self::Testnet),
            _ => None,
        }
    }
}

pub(crate) fn decode(s: &str) -> Result<(WifNetwork, [u8; PRIVATE_KEY_SIZE]), KeyError> {
    let payload = bs58::decode(s.trim())
        .with_check(None)
        .into_vec()
        .map_err(|e| KeyError::InvalidWif(e.to_string()))?;

    let [version, key @ .., flag] = payload.as_slice() else {
        return Err(KeyError::InvalidWif("empty payload".to_string()));
    };

    let network = WifNetwork::from_version(*version)
        .ok_or_else(|| KeyError::InvalidWif(format!("unknown version byte {version:#04x}")))?;

    if *flag != COMPRESSED_FLAG || key.len() != PRIVATE_KEY_SIZE {
        return Err(KeyError::InvalidWif(
            "expected a compressed private key".to_string(),
        ));
    }

    let mut out = [0; PRIVATE_KEY_SIZE];
    out.copy_from_slice(key);
    Ok((network, out))
}

pub(crate) fn encode(network: WifNetwork, key: &[u8; PRIVATE_KEY_SIZE]) -> String {
    let mut payload = Vec::with_capacity(PRIVATE_KEY_SIZE + 2);
    payload.push(network.version());
    payload.extend_from_slice(key);
    payload.push(COMPRESSED_FLAG);

    bs58::encode(payload).with_check().into_string()
}
