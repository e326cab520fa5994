//! Dynamic-fee crypto pool venue with a proportional haircut.

use alloy_primitives::{Address, U256};

use super::{PoolAdapter, TokenResolver};
use crate::domain::{Amount, BasisPoints, QuoteCorrection};
use crate::error::{AdapterError, Result};
use crate::host::Chain;
use crate::protocols::crypto::CryptoPool;
use crate::traits::Venue;

/// Adapter over a crypto pool.
pub type CryptoAdapter = PoolAdapter<CryptoVenue>;

/// Haircut covering the gap between the pool's view fee and its
/// settlement fee.
pub const CRYPTO_HAIRCUT: BasisPoints = BasisPoints::new(4);

/// Routes by `uint256` coin index.
#[derive(Debug, Clone)]
pub struct CryptoVenue {
    pool: Address,
    tokens: TokenResolver,
}

impl CryptoVenue {
    /// Reads the first `token_count` coins of `pool`.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors and [`AdapterError::TokenIndexOutOfRange`]
    /// if the pool has fewer coins.
    pub fn new(chain: &Chain, pool: Address, token_count: usize) -> Result<Self> {
        let contract = chain.contract::<CryptoPool>(pool)?;
        let coins = (0..token_count)
            .map(|i| contract.coins(U256::from(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pool,
            tokens: TokenResolver::indexed(&coins),
        })
    }
}

impl Venue for CryptoVenue {
    type Route = (usize, usize);

    const PROTOCOL: &'static str = "crypto";
    const CORRECTION: QuoteCorrection = QuoteCorrection::Haircut(CRYPTO_HAIRCUT);

    fn pool(&self) -> Address {
        self.pool
    }

    fn is_pool_token(&self, _: &Chain, token: Address) -> bool {
        self.tokens.is_pool_token(token)
    }

    fn resolve(&self, _: &Chain, from: Address, to: Address) -> Option<(usize, usize)> {
        self.tokens.indices(from, to)
    }

    fn quote(&self, chain: &Chain, (i, j): (usize, usize), amount_in: Amount) -> Result<Amount> {
        let view = chain.call::<CryptoPool, _, _>(self.pool, |p, ledger| {
            p.get_dy(ledger, U256::from(i), U256::from(j), amount_in)
        })?;
        Self::CORRECTION.apply(view)
    }

    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        (i, j): (usize, usize),
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()> {
        let to = self
            .tokens
            .token_at(j)
            .ok_or(AdapterError::TokenIndexOutOfRange)?;
        let received = chain.call_mut::<CryptoPool, _, _>(self.pool, |p, ledger| {
            p.exchange(ledger, custody, (U256::from(i), U256::from(j)), amount_in, Amount::ZERO)
        })?;
        chain.ledger_mut().transfer(to, custody, recipient, received)
    }
}
