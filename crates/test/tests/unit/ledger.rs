use avaproof_core_types::{Amount, ProofBuilder, StakeClaim};
use avaproof_test::{coin_claim, ledger_for, make_keys, outpoint, DEFAULT_HEIGHT, DEFAULT_SEED};
use avaproof_validation::{Coin, CoinView, StakeCheckError, StakeIssue, StakeValidator};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn claims() -> Vec<StakeClaim> {
    let [key] = make_keys(DEFAULT_SEED);
    (0..4).map(|n| coin_claim(n, 10, &key)).collect()
}

#[test]
fn matching_stakes_pass() {
    let claims = claims();
    let ledger = ledger_for(&claims);

    assert!(StakeValidator::new(&ledger).check(&claims).is_empty());
}

#[rstest]
#[case::spent(None, StakeCheckError::MissingOrSpent)]
#[case::amount(
    Some(Coin::new(Amount::from_coins(9), DEFAULT_HEIGHT, false)),
    StakeCheckError::AmountMismatch { claimed: Amount::from_coins(10), actual: Amount::from_coins(9) }
)]
#[case::height(
    Some(Coin::new(Amount::from_coins(10), DEFAULT_HEIGHT + 1, false)),
    StakeCheckError::HeightMismatch { claimed: DEFAULT_HEIGHT, actual: DEFAULT_HEIGHT + 1 }
)]
#[case::coinbase(
    Some(Coin::new(Amount::from_coins(10), DEFAULT_HEIGHT, true)),
    StakeCheckError::CoinbaseMismatch { claimed: false }
)]
fn mismatching_stake(#[case] coin: Option<Coin>, #[case] expected: StakeCheckError) {
    let claims = claims();
    let mut ledger = ledger_for(&claims);

    ledger.spend(&outpoint(2));
    if let Some(coin) = coin {
        ledger.add_coin(outpoint(2), coin);
    }

    assert_eq!(
        StakeValidator::new(&ledger).check(&claims),
        vec![StakeIssue {
            index: 2,
            outpoint: outpoint(2),
            error: expected,
        }]
    );
}

#[test]
fn every_issue_is_reported() {
    let claims = claims();
    let mut ledger = ledger_for(&claims);

    ledger.spend(&outpoint(0));
    ledger.spend(&outpoint(3));

    let issues = StakeValidator::new(&ledger).check(&claims);
    let indices: Vec<_> = issues.iter().map(|issue| issue.index).collect();

    assert_eq!(indices, vec![0, 3]);
    assert!(issues
        .iter()
        .all(|issue| issue.error == StakeCheckError::MissingOrSpent));
}

#[test]
fn signed_stakes_are_checked_like_claims() {
    let [key] = make_keys(DEFAULT_SEED);
    let claims = claims();

    let proof = ProofBuilder::new(0, 0, key.public_key())
        .with_stakes(claims.clone())
        .build()
        .unwrap();

    let mut ledger = ledger_for(&claims);
    assert!(StakeValidator::new(&ledger).check(proof.stakes()).is_empty());

    ledger.spend(&outpoint(1));
    let validator = StakeValidator::new(&ledger);

    assert_eq!(validator.check(proof.stakes()).len(), 1);
    assert_eq!(
        validator.check_one(&proof.stakes()[1].stake),
        Err(StakeCheckError::MissingOrSpent)
    );
}

#[test]
fn memory_view() {
    let mut ledger = ledger_for(&claims());
    assert_eq!(ledger.len(), 4);

    let coin = ledger.coin(&outpoint(1)).unwrap();
    assert_eq!(coin, Coin::new(Amount::from_coins(10), DEFAULT_HEIGHT, false));

    assert_eq!(ledger.spend(&outpoint(1)), Some(coin));
    assert_eq!(ledger.spend(&outpoint(1)), None);
    assert_eq!(ledger.coin(&outpoint(1)), None);
    assert_eq!(ledger.len(), 3);
}
