use std::time::Duration;

use avaproof_config::AvalancheConfig;
use avaproof_core_types::{Amount, DelegateError, Proof, ProofBuilder, Signature, SignedStake};
use avaproof_node::{StartupError, StartupState, StartupValidator};
use avaproof_peer::PeerRegistry;
use avaproof_test::{
    coin_claim, make_keys, proof_with_stakes, scenario_key, to_hex, DEFAULT_SEED, SCENARIO_WIF,
};
use avaproof_validation::ProofVerifier;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio::sync::watch;

fn staked_config() -> AvalancheConfig {
    let key = scenario_key();
    let proof = ProofBuilder::new(11, 12, key.public_key())
        .with_stake(coin_claim(0, 50, &key))
        .build()
        .unwrap();

    AvalancheConfig {
        proof: Some(to_hex(&proof)),
        master_key: Some(SCENARIO_WIF.to_string()),
        ..AvalancheConfig::default()
    }
}

fn scenario_proof(stakes: u32) -> Proof {
    let master = scenario_key();
    proof_with_stakes(stakes, &master, &master)
}

fn duplicated_stake_proof() -> Proof {
    let master = scenario_key();
    ProofBuilder::new(1, 0, master.public_key())
        .with_stake(coin_claim(0, 1, &master))
        .with_stake(coin_claim(0, 1, &master))
        .build()
        .unwrap()
}

fn bad_signature_proof() -> Proof {
    let proof = scenario_proof(2);
    let mut stakes = proof.stakes().to_vec();

    let mut bytes = stakes[1].signature.to_bytes();
    bytes[10] ^= 0x01;
    stakes[1] = SignedStake::new(stakes[1].stake, Signature::from_bytes(bytes));

    Proof::new(proof.sequence(), proof.expiration(), *proof.master(), stakes)
}

fn startup_error(config: &AvalancheConfig) -> StartupError {
    StartupValidator::from_config(config).unwrap_err()
}

#[test]
fn no_proof_configured() {
    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&AvalancheConfig::default()).unwrap();

    assert!(validator.state().is_pending());
    assert!(validator.master_public_key().is_none());

    assert!(matches!(
        validator.on_ledger_synced(&registry),
        StartupState::NoProof
    ));
    assert_eq!(registry.proof_count(), 0);
}

#[test]
fn session_key_is_generated_when_absent() {
    let a = StartupValidator::from_config(&AvalancheConfig::default()).unwrap();
    let b = StartupValidator::from_config(&AvalancheConfig::default()).unwrap();
    assert_ne!(a.session_public_key(), b.session_public_key());

    let [key] = make_keys(DEFAULT_SEED);
    let config = AvalancheConfig {
        session_key: Some(hex::encode(key.to_bytes())),
        ..AvalancheConfig::default()
    };

    let validator = StartupValidator::from_config(&config).unwrap();
    assert_eq!(validator.session_public_key(), key.public_key());
}

#[rstest]
#[case::bad_session_key(
    AvalancheConfig { session_key: Some("not a key".into()), ..staked_config() },
    "the avalanche session key is invalid"
)]
#[case::missing_master_key(
    AvalancheConfig { master_key: None, ..staked_config() },
    "the avalanche master key is missing for the avalanche proof"
)]
#[case::bad_master_key(
    AvalancheConfig { master_key: Some("cND2ZvtabDbJ1gucx9GWH6XT9kgTAqfb6cotPt5Q5CyxVDhid2EM".into()), ..staked_config() },
    "the avalanche master key is invalid"
)]
#[case::proof_not_hex(
    AvalancheConfig { proof: Some("not hex".into()), ..staked_config() },
    "the avalanche proof has invalid format"
)]
#[case::proof_truncated(
    AvalancheConfig { proof: Some("0b00000000000000".into()), ..staked_config() },
    "the avalanche proof has invalid format"
)]
fn configuration_errors(#[case] config: AvalancheConfig, #[case] message: &str) {
    assert_eq!(startup_error(&config).to_string(), message);
}

#[test]
fn master_key_must_match_the_proof() {
    let [other] = make_keys(DEFAULT_SEED);
    let config = AvalancheConfig {
        master_key: Some(hex::encode(other.to_bytes())),
        ..staked_config()
    };

    assert_eq!(startup_error(&config), StartupError::MasterKeyMismatch);
    assert_eq!(
        startup_error(&config).to_string(),
        "the avalanche master key does not match the proof"
    );
}

#[test]
fn valid_proof_is_registered_once_synced() {
    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&staked_config()).unwrap();

    assert_eq!(validator.master_public_key(), Some(scenario_key().public_key()));
    assert_eq!(registry.proof_count(), 0);

    let StartupState::Verified(local) = validator.on_ledger_synced(&registry).clone() else {
        panic!("expected a verified proof, got {:?}", validator.state());
    };

    let peer = registry.proof(&local.verified.proof_id).unwrap();
    assert!(peer.local);
    assert!(peer.nodes.is_empty());
    assert_eq!(local.verified.authority, validator.session_public_key());
}

#[test]
fn session_key_holds_authority_over_the_proof() {
    let [session] = make_keys(DEFAULT_SEED);
    let config = AvalancheConfig {
        session_key: Some(hex::encode(session.to_bytes())),
        ..staked_config()
    };

    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&config).unwrap();

    let StartupState::Verified(local) = validator.on_ledger_synced(&registry).clone() else {
        panic!("expected a verified proof, got {:?}", validator.state());
    };

    assert_eq!(local.verified.authority, session.public_key());
    assert_ne!(local.verified.authority, *local.proof.master());

    assert_eq!(local.delegation.limited_id(), local.proof.limited_id());
    assert_eq!(local.delegation.levels().len(), 1);
    assert_eq!(local.delegation.terminal_key(), Some(&session.public_key()));

    let verifier = ProofVerifier::new(config.proof_params());
    let verified = verifier
        .verify_with_delegation(&local.proof, Some(&local.delegation))
        .unwrap();
    assert_eq!(verified.authority, session.public_key());
}

#[test]
fn failed_delegation_is_fatal() {
    let config = AvalancheConfig {
        max_delegation_levels: 0,
        ..staked_config()
    };

    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&config).unwrap();

    match validator.on_ledger_synced(&registry) {
        StartupState::Fatal(e) => assert_eq!(
            *e,
            StartupError::Delegation(DelegateError::TooManyLevels { max: 0 })
        ),
        state => panic!("unexpected state {state:?}"),
    }
    assert_eq!(registry.proof_count(), 0);
}

#[test]
fn transition_happens_once() {
    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&staked_config()).unwrap();

    validator.on_ledger_synced(&registry);
    let proof_id = match validator.state() {
        StartupState::Verified(local) => local.verified.proof_id,
        state => panic!("unexpected state {state:?}"),
    };

    registry.evict_proof(&proof_id).unwrap();

    // A second signal neither verifies nor registers again
    assert!(matches!(
        validator.on_ledger_synced(&registry),
        StartupState::Verified(_)
    ));
    assert_eq!(registry.proof_count(), 0);
}

#[rstest]
#[case::no_stake(
    scenario_proof(0),
    AvalancheConfig::default(),
    "the avalanche proof has no stake"
)]
#[case::stake_too_low(
    scenario_proof(2),
    AvalancheConfig { dust_threshold: Amount::from_coins(2).units(), ..AvalancheConfig::default() },
    "the avalanche proof stake is too low"
)]
#[case::duplicated_stake(
    duplicated_stake_proof(),
    AvalancheConfig::default(),
    "the avalanche proof has duplicated stake"
)]
#[case::too_many_utxos(
    scenario_proof(3),
    AvalancheConfig { max_proof_stakes: 2, ..AvalancheConfig::default() },
    "the avalanche proof has too many utxos (max: 2)"
)]
#[case::invalid_stake_signature(
    bad_signature_proof(),
    AvalancheConfig::default(),
    "the avalanche proof has invalid stake signatures"
)]
fn rejected_proof_is_fatal(
    #[case] proof: Proof,
    #[case] config: AvalancheConfig,
    #[case] message: &str,
) {
    let config = AvalancheConfig {
        proof: Some(to_hex(&proof)),
        master_key: Some(SCENARIO_WIF.to_string()),
        ..config
    };

    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&config).unwrap();

    match validator.on_ledger_synced(&registry) {
        StartupState::Fatal(e) => assert_eq!(e.to_string(), message),
        state => panic!("unexpected state {state:?}"),
    }

    assert!(validator.state().is_fatal());
    assert_eq!(registry.proof_count(), 0);
}

#[tokio::test]
async fn run_waits_for_the_ledger() {
    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&staked_config()).unwrap();
    let (synced_tx, synced_rx) = watch::channel(false);

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        validator.run(synced_rx.clone(), &registry),
    )
    .await
    .is_err();

    assert!(timed_out);
    assert!(validator.state().is_pending());
    assert_eq!(registry.proof_count(), 0);

    synced_tx.send(true).unwrap();

    let local = validator.run(synced_rx, &registry).await.unwrap().unwrap();
    assert!(registry.contains_proof(&local.verified.proof_id));
}

#[tokio::test]
async fn run_reports_fatal_rejection() {
    let config = AvalancheConfig {
        proof: Some(to_hex(&scenario_proof(0))),
        master_key: Some(SCENARIO_WIF.to_string()),
        ..AvalancheConfig::default()
    };

    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&config).unwrap();
    let (synced_tx, synced_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        synced_tx.send(true).unwrap();
    });

    let error = validator.run(synced_rx, &registry).await.unwrap_err();
    assert_eq!(error.to_string(), "the avalanche proof has no stake");

    task.await.unwrap();
}

#[tokio::test]
async fn run_without_sync_signal() {
    let registry = PeerRegistry::new();
    let mut validator = StartupValidator::from_config(&staked_config()).unwrap();

    let (synced_tx, synced_rx) = watch::channel(false);
    drop(synced_tx);

    assert_eq!(
        validator.run(synced_rx, &registry).await.unwrap_err(),
        StartupError::SyncInterrupted
    );
    assert!(validator.state().is_pending());
}
