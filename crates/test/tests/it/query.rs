use std::sync::Arc;

use avaproof_core_types::{Amount, OutPoint, PrivateKey, ProofParams};
use avaproof_node::{NodeError, ProofService, StakeRequest};
use avaproof_peer::{NodeId, PeerRegistry};
use avaproof_test::{
    make_keys, proof_with_stakes, scenario_key, to_hex, txid, DEFAULT_SEED, SCENARIO_PUBKEY,
    SCENARIO_WIF,
};
use avaproof_validation::{Coin, MemoryCoinView};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn service() -> ProofService {
    ProofService::new(ProofParams::default(), PeerRegistry::new())
}

fn stake_request(n: u32, coins: u64, key: &str) -> StakeRequest {
    StakeRequest {
        txid: txid(n).to_hex(),
        vout: 0,
        amount: coins * 1_000_000,
        height: 10,
        iscoinbase: true,
        privatekey: key.to_string(),
    }
}

fn scenario_proof_hex(service: &ProofService) -> String {
    service
        .build(11, 12, SCENARIO_PUBKEY, &[stake_request(1, 50, SCENARIO_WIF)])
        .unwrap()
}

fn hex_key(key: &PrivateKey) -> String {
    hex::encode(key.to_bytes())
}

#[test]
fn build_decode_verify() {
    let service = service();
    let proof = scenario_proof_hex(&service);

    assert_eq!(service.verify(&proof), Ok(true));

    let decoded = service.decode(&proof).unwrap();
    assert_eq!(decoded.sequence, 11);
    assert_eq!(decoded.expiration, 12);
    assert_eq!(decoded.master, SCENARIO_PUBKEY);
    assert_eq!(decoded.staked_amount, 50_000_000);
    assert_eq!(decoded.stakes.len(), 1);

    let stake = &decoded.stakes[0];
    assert_eq!(stake.txid, txid(1).to_hex());
    assert_eq!(stake.vout, 0);
    assert_eq!(stake.amount, 50_000_000);
    assert_eq!(stake.height, 10);
    assert!(stake.iscoinbase);
    assert_eq!(stake.pubkey, SCENARIO_PUBKEY);
    assert_eq!(stake.signature.len(), 88);
}

#[test]
fn decoded_view_is_json() {
    let service = service();
    let decoded = service.decode(&scenario_proof_hex(&service)).unwrap();

    let json = serde_json::to_value(&decoded).unwrap();
    for field in ["sequence", "expiration", "master", "proofid", "limitedid", "stakes"] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
    for field in ["txid", "vout", "amount", "height", "iscoinbase", "pubkey", "signature"] {
        assert!(json["stakes"][0].get(field).is_some(), "missing stake {field}");
    }
}

#[test]
fn zero_amount_stake_builds_an_unstaked_proof() {
    let service = service();

    let proof = service
        .build(11, 12, SCENARIO_PUBKEY, &[stake_request(1, 0, SCENARIO_WIF)])
        .unwrap();

    assert_eq!(
        service.verify(&proof).unwrap_err().to_string(),
        "The proof is invalid: no-stake"
    );
}

#[rstest]
#[case::not_hex("xyz", "Proof must be an hexadecimal string")]
#[case::odd_length("abc", "Proof must be an hexadecimal string")]
#[case::empty("", "Proof has invalid format")]
#[case::truncated("0b000000", "Proof has invalid format")]
fn verify_format_errors(#[case] proof: &str, #[case] message: &str) {
    let service = service();
    assert_eq!(service.verify(proof).unwrap_err().to_string(), message);
    assert_eq!(service.decode(proof).unwrap_err().to_string(), message);
}

#[test]
fn verify_reports_the_reason() {
    let service = service();

    let dust = service
        .build(
            0,
            0,
            SCENARIO_PUBKEY,
            &[StakeRequest {
                amount: 999_999,
                ..stake_request(1, 1, SCENARIO_WIF)
            }],
        )
        .unwrap();

    assert_eq!(
        service.verify(&dust).unwrap_err().to_string(),
        "The proof is invalid: amount-below-dust-threshold"
    );

    let duplicated = service
        .build(
            0,
            0,
            SCENARIO_PUBKEY,
            &[stake_request(1, 1, SCENARIO_WIF), stake_request(1, 2, SCENARIO_WIF)],
        )
        .unwrap();

    assert_eq!(
        service.verify(&duplicated).unwrap_err().to_string(),
        "The proof is invalid: duplicated-stake"
    );
}

#[test]
fn build_input_errors() {
    let service = service();

    assert_eq!(
        service
            .build(0, 0, "02abcd", &[stake_request(1, 1, SCENARIO_WIF)])
            .unwrap_err(),
        NodeError::InvalidPublicKey
    );

    assert_eq!(
        service
            .build(0, 0, SCENARIO_PUBKEY, &[stake_request(1, 1, "not a key")])
            .unwrap_err()
            .to_string(),
        "The private key is invalid"
    );

    let request = StakeRequest {
        txid: "1234".to_string(),
        ..stake_request(1, 1, SCENARIO_WIF)
    };
    assert!(matches!(
        service.build(0, 0, SCENARIO_PUBKEY, &[request]),
        Err(NodeError::InvalidParameter(_))
    ));
}

#[test]
fn build_checks_stakes_against_the_ledger() {
    let mut ledger = MemoryCoinView::new();
    ledger.add_coin(
        OutPoint::new(txid(1), 0),
        Coin::new(Amount::from_coins(49), 10, true),
    );

    let service = service().with_ledger(Arc::new(ledger));

    // The mismatch is only reported, the proof is still built and signed
    let proof = scenario_proof_hex(&service);
    assert_eq!(service.verify(&proof), Ok(true));
}

#[test]
fn delegate_and_extend() {
    let service = service();
    let proof = scenario_proof_hex(&service);
    let [first, second] = make_keys(DEFAULT_SEED);

    let delegation = service
        .delegate(&proof, SCENARIO_WIF, &first.public_key().to_hex(), None)
        .unwrap();

    assert_eq!(service.verify_delegation(&proof, &delegation), Ok(true));

    let extended = service
        .delegate(
            &proof,
            &hex_key(&first),
            &second.public_key().to_hex(),
            Some(&delegation),
        )
        .unwrap();

    assert_eq!(service.verify_delegation(&proof, &extended), Ok(true));

    let decoded = service.decode_delegation(&extended).unwrap();
    assert_eq!(decoded.depth, 2);
    assert_eq!(decoded.limitedid, service.decode(&proof).unwrap().limitedid);
    assert_eq!(decoded.levels[0].pubkey, first.public_key().to_hex());
    assert_eq!(decoded.levels[1].pubkey, second.public_key().to_hex());
    assert_ne!(
        decoded.delegationid,
        service.decode_delegation(&delegation).unwrap().delegationid
    );
}

#[test]
fn delegate_errors() {
    let service = service();
    let proof = scenario_proof_hex(&service);
    let [first, second] = make_keys(DEFAULT_SEED);
    let delegate = first.public_key().to_hex();

    let message = |result: Result<String, NodeError>| result.unwrap_err().to_string();

    // Not the master, and no prior delegation
    assert_eq!(
        message(service.delegate(&proof, &hex_key(&second), &delegate, None)),
        "The private key does not match the proof or the delegation"
    );

    assert_eq!(
        message(service.delegate(&proof, "bogus", &delegate, None)),
        "The private key is invalid"
    );

    assert_eq!(
        message(service.delegate(&proof, SCENARIO_WIF, "02", None)),
        "Invalid public key"
    );

    let [master] = make_keys(DEFAULT_SEED + 3);
    let unstaked = to_hex(&proof_with_stakes(0, &master, &master));
    assert_eq!(
        message(service.delegate(&unstaked, &hex_key(&master), &delegate, None)),
        "The proof is invalid"
    );

    assert_eq!(
        message(service.delegate("zz", SCENARIO_WIF, &delegate, None)),
        "Proof must be an hexadecimal string"
    );

    assert_eq!(
        message(service.delegate(&proof, SCENARIO_WIF, &delegate, Some("00"))),
        "The supplied delegation is not valid"
    );

    // A prior delegation for another proof
    let other = to_hex(&proof_with_stakes(1, &master, &master));
    let foreign = service
        .delegate(&other, &hex_key(&master), &delegate, None)
        .unwrap();
    assert_eq!(
        message(service.delegate(&proof, &hex_key(&first), &delegate, Some(&foreign))),
        "The supplied delegation is not valid"
    );

    // Extending requires the terminal key, not the master
    let delegation = service
        .delegate(&proof, SCENARIO_WIF, &delegate, None)
        .unwrap();
    assert_eq!(
        message(service.delegate(&proof, SCENARIO_WIF, &delegate, Some(&delegation))),
        "The private key does not match the proof or the delegation"
    );
}

#[test]
fn verify_delegation_errors() {
    let service = service();
    let proof = scenario_proof_hex(&service);

    assert_eq!(
        service.verify_delegation(&proof, "zz").unwrap_err(),
        NodeError::DelegationNotHex
    );
    assert_eq!(
        service.verify_delegation(&proof, "00").unwrap_err(),
        NodeError::DelegationInvalidFormat
    );

    let [master, delegate] = make_keys(DEFAULT_SEED + 3);
    let other = to_hex(&proof_with_stakes(1, &master, &master));
    let foreign = service
        .delegate(&other, &hex_key(&master), &delegate.public_key().to_hex(), None)
        .unwrap();

    assert_eq!(
        service.verify_delegation(&proof, &foreign).unwrap_err().to_string(),
        "The supplied delegation is not valid"
    );
}

#[test]
fn admit_and_inspect_peers() {
    let service = service();
    let proof = scenario_proof_hex(&service);
    let [delegate] = make_keys(DEFAULT_SEED);

    assert_eq!(service.admit(NodeId::new(1), SCENARIO_PUBKEY, &proof, None), Ok(true));

    let delegation = service
        .delegate(&proof, SCENARIO_WIF, &delegate.public_key().to_hex(), None)
        .unwrap();

    assert_eq!(
        service.admit(
            NodeId::new(2),
            &delegate.public_key().to_hex(),
            &proof,
            Some(&delegation)
        ),
        Ok(true)
    );

    // Wrong key: rejected without touching the registry
    assert_eq!(
        service.admit(NodeId::new(3), &delegate.public_key().to_hex(), &proof, None),
        Ok(false)
    );

    let peers = service.peer_info();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].proof, proof);
    assert_eq!(peers[0].nodecount, 2);
    assert_eq!(peers[0].nodes, vec![1, 2]);
    assert!(!peers[0].local);

    assert!(service.disconnect(NodeId::new(1)));
    assert!(!service.disconnect(NodeId::new(1)));
    assert_eq!(service.peer_info()[0].nodes, vec![2]);

    let proofid = peers[0].proofid.clone();
    assert_eq!(service.evict(&proofid), Ok(true));
    assert_eq!(service.evict(&proofid), Ok(false));
    assert!(service.peer_info().is_empty());
    assert_eq!(service.registry().node_count(), 0);
}

#[test]
fn admit_errors() {
    let service = service();
    let proof = scenario_proof_hex(&service);

    assert_eq!(
        service
            .admit(NodeId::new(1), "zz", &proof, None)
            .unwrap_err()
            .to_string(),
        "Invalid public key"
    );
    assert_eq!(
        service.admit(NodeId::new(1), SCENARIO_PUBKEY, "00", None),
        Err(NodeError::ProofInvalidFormat)
    );
    assert_eq!(
        service.admit(NodeId::new(1), SCENARIO_PUBKEY, &proof, Some("0")),
        Err(NodeError::DelegationNotHex)
    );
    assert!(matches!(service.evict("1234"), Err(NodeError::InvalidParameter(_))));
    assert_eq!(service.registry().node_count(), 0);
}

#[test]
fn verify_never_touches_the_registry() {
    let service = service();
    let proof = scenario_proof_hex(&service);

    service.verify(&proof).unwrap();
    service.verify(&proof).unwrap();
    service.decode(&proof).unwrap();

    assert!(service.peer_info().is_empty());
}

#[test]
fn scenario_key_as_hex_or_wif() {
    let service = service();
    let wif = scenario_proof_hex(&service);

    let from_hex = service
        .build(
            11,
            12,
            SCENARIO_PUBKEY,
            &[stake_request(1, 50, &hex_key(&scenario_key()))],
        )
        .unwrap();

    assert_eq!(wif, from_hex);
}
