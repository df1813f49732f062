//! Checking stakes against the ledger's unspent outputs.

use std::collections::BTreeMap;

use avaproof_core_types::{Amount, OutPoint, SignedStake, Stake, StakeClaim};
use thiserror::Error;
use tracing::warn;

/// An unspent output as recorded by the ledger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Coin {
    pub amount: Amount,
    pub height: u32,
    pub is_coinbase: bool,
}

impl Coin {
    pub fn new(amount: Amount, height: u32, is_coinbase: bool) -> Self {
        Self {
            amount,
            height,
            is_coinbase,
        }
    }
}

/// Read-only view over the ledger's unspent outputs.
pub trait CoinView {
    /// The unspent output at `outpoint`, or `None` if it is unknown or spent.
    fn coin(&self, outpoint: &OutPoint) -> Option<Coin>;
}

impl<V: CoinView + ?Sized> CoinView for &V {
    fn coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        (**self).coin(outpoint)
    }
}

/// A [`CoinView`] over an in-memory set of outputs.
#[derive(Clone, Debug, Default)]
pub struct MemoryCoinView {
    coins: BTreeMap<OutPoint, Coin>,
}

impl MemoryCoinView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_coin(&mut self, outpoint: OutPoint, coin: Coin) -> &mut Self {
        self.coins.insert(outpoint, coin);
        self
    }

    /// Mark an output as spent. Returns the coin if it was unspent.
    pub fn spend(&mut self, outpoint: &OutPoint) -> Option<Coin> {
        self.coins.remove(outpoint)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

impl FromIterator<(OutPoint, Coin)> for MemoryCoinView {
    fn from_iter<I: IntoIterator<Item = (OutPoint, Coin)>>(iter: I) -> Self {
        Self {
            coins: iter.into_iter().collect(),
        }
    }
}

impl CoinView for MemoryCoinView {
    fn coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        self.coins.get(outpoint).copied()
    }
}

/// Anything that claims an output with a given amount, height and coinbase flag.
pub trait ClaimedCoin {
    fn outpoint(&self) -> &OutPoint;
    fn claimed(&self) -> Coin;
}

impl ClaimedCoin for Stake {
    fn outpoint(&self) -> &OutPoint {
        &self.outpoint
    }

    fn claimed(&self) -> Coin {
        Coin::new(self.amount, self.height, self.is_coinbase)
    }
}

impl ClaimedCoin for SignedStake {
    fn outpoint(&self) -> &OutPoint {
        &self.stake.outpoint
    }

    fn claimed(&self) -> Coin {
        self.stake.claimed()
    }
}

impl ClaimedCoin for StakeClaim {
    fn outpoint(&self) -> &OutPoint {
        &self.outpoint
    }

    fn claimed(&self) -> Coin {
        Coin::new(self.amount, self.height, self.is_coinbase)
    }
}

/// How a claimed stake disagrees with the ledger.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum StakeCheckError {
    #[error("The output is unknown or already spent")]
    MissingOrSpent,

    #[error("The claimed amount {claimed} does not match the output amount {actual}")]
    AmountMismatch { claimed: Amount, actual: Amount },

    #[error("The claimed height {claimed} does not match the output height {actual}")]
    HeightMismatch { claimed: u32, actual: u32 },

    #[error("The claimed coinbase flag does not match the output")]
    CoinbaseMismatch { claimed: bool },
}

/// A stake that failed the ledger check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StakeIssue {
    /// Position of the stake in the input
    pub index: usize,
    pub outpoint: OutPoint,
    pub error: StakeCheckError,
}

/// Compares stakes with the unspent outputs they claim.
///
/// The check is advisory: a stake that disagrees with the ledger is reported,
/// and it is up to the caller whether to proceed.
#[derive(Copy, Clone, Debug)]
pub struct StakeValidator<V> {
    view: V,
}

impl<V: CoinView> StakeValidator<V> {
    pub fn new(view: V) -> Self {
        Self { view }
    }

    /// Check a single stake.
    pub fn check_one<C: ClaimedCoin + ?Sized>(&self, stake: &C) -> Result<(), StakeCheckError> {
        let Some(actual) = self.view.coin(stake.outpoint()) else {
            return Err(StakeCheckError::MissingOrSpent);
        };

        let claimed = stake.claimed();

        if claimed.amount != actual.amount {
            return Err(StakeCheckError::AmountMismatch {
                claimed: claimed.amount,
                actual: actual.amount,
            });
        }

        if claimed.height != actual.height {
            return Err(StakeCheckError::HeightMismatch {
                claimed: claimed.height,
                actual: actual.height,
            });
        }

        if claimed.is_coinbase != actual.is_coinbase {
            return Err(StakeCheckError::CoinbaseMismatch {
                claimed: claimed.is_coinbase,
            });
        }

        Ok(())
    }

    /// Check every stake, reporting all of the ones that disagree with the ledger.
    pub fn check<'a, C, I>(&self, stakes: I) -> Vec<StakeIssue>
    where
        C: ClaimedCoin + 'a,
        I: IntoIterator<Item = &'a C>,
    {
        stakes
            .into_iter()
            .enumerate()
            .filter_map(|(index, stake)| {
                let error = self.check_one(stake).err()?;
                warn!(index, outpoint = %stake.outpoint(), "Stake does not match the ledger: {error}");

                Some(StakeIssue {
                    index,
                    outpoint: *stake.outpoint(),
                    error,
                })
            })
            .collect()
    }
}
