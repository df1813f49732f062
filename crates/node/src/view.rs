//! Serializable views returned by queries.

use avaproof_codec::Encode;
use avaproof_core_types::{Delegation, Proof, SignedStake};
use avaproof_peer::PeerSnapshot;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A decoded proof. Amounts are in units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedProof {
    pub sequence: u64,
    pub expiration: i64,
    pub master: String,
    pub proofid: String,
    pub limitedid: String,
    pub staked_amount: u64,
    pub stakes: Vec<DecodedStake>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedStake {
    pub txid: String,
    pub vout: u32,
    pub amount: u64,
    pub height: u32,
    pub iscoinbase: bool,
    pub pubkey: String,
    /// Base64 of the 64-byte compact signature
    pub signature: String,
}

impl From<&SignedStake> for DecodedStake {
    fn from(signed: &SignedStake) -> Self {
        let stake = &signed.stake;

        Self {
            txid: stake.outpoint.txid.to_hex(),
            vout: stake.outpoint.vout,
            amount: stake.amount.units(),
            height: stake.height,
            iscoinbase: stake.is_coinbase,
            pubkey: stake.pubkey.to_hex(),
            signature: BASE64_STANDARD.encode(signed.signature.as_bytes()),
        }
    }
}

impl From<&Proof> for DecodedProof {
    fn from(proof: &Proof) -> Self {
        Self {
            sequence: proof.sequence(),
            expiration: proof.expiration(),
            master: proof.master().to_hex(),
            proofid: proof.id().to_hex(),
            limitedid: proof.limited_id().to_hex(),
            staked_amount: proof.staked_amount().units(),
            stakes: proof.stakes().iter().map(DecodedStake::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedDelegation {
    pub limitedid: String,
    pub delegationid: String,
    pub depth: usize,
    pub levels: Vec<DecodedLevel>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLevel {
    pub index: usize,
    pub pubkey: String,
}

impl From<&Delegation> for DecodedDelegation {
    fn from(delegation: &Delegation) -> Self {
        Self {
            limitedid: delegation.limited_id().to_hex(),
            delegationid: delegation.id().to_hex(),
            depth: delegation.levels().len(),
            levels: delegation
                .levels()
                .iter()
                .enumerate()
                .map(|(index, level)| DecodedLevel {
                    index,
                    pubkey: level.pubkey.to_hex(),
                })
                .collect(),
        }
    }
}

/// A registered proof and the nodes bound to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub proofid: String,
    pub limitedid: String,
    pub proof: String,
    pub nodecount: usize,
    pub nodes: Vec<u64>,
    pub local: bool,
}

impl From<&PeerSnapshot> for PeerInfo {
    fn from(peer: &PeerSnapshot) -> Self {
        Self {
            proofid: peer.proof_id().to_hex(),
            limitedid: peer.limited_id().to_hex(),
            proof: hex::encode(peer.proof.encode_to_vec()),
            nodecount: peer.nodes.len(),
            nodes: peer.nodes.iter().map(|node| node.as_u64()).collect(),
            local: peer.local,
        }
    }
}
