//! StableSwap venue for pools enumerated by `getToken(uint8)`.

use alloy_primitives::Address;

use super::{PoolAdapter, TokenResolver};
use crate::domain::{Amount, QuoteCorrection};
use crate::error::{AdapterError, Result};
use crate::host::Chain;
use crate::protocols::saddle::SaddlePool;
use crate::traits::Venue;

/// Adapter over a Saddle-style pool.
pub type SaddleAdapter = PoolAdapter<SaddleVenue>;

/// Routes by `uint8` token index; settlement is exact.
#[derive(Debug, Clone)]
pub struct SaddleVenue {
    pool: Address,
    tokens: TokenResolver,
}

fn narrow(index: usize) -> Result<u8> {
    u8::try_from(index).map_err(|_| AdapterError::TokenIndexOutOfRange)
}

impl SaddleVenue {
    /// Reads the first `token_count` coins of `pool`.
    ///
    /// The count itself is trusted; verify it at deployment with
    /// [`check_token_count`](crate::deployment::check_token_count).
    ///
    /// # Errors
    ///
    /// Propagates lookup errors and [`AdapterError::TokenIndexOutOfRange`]
    /// if the pool has fewer coins.
    pub fn new(chain: &Chain, pool: Address, token_count: u8) -> Result<Self> {
        let contract = chain.contract::<SaddlePool>(pool)?;
        let coins = (0..token_count)
            .map(|i| contract.get_token(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pool,
            tokens: TokenResolver::indexed(&coins),
        })
    }
}

impl Venue for SaddleVenue {
    type Route = (u8, u8);

    const PROTOCOL: &'static str = "stableswap-saddle";
    const CORRECTION: QuoteCorrection = QuoteCorrection::None;

    fn pool(&self) -> Address {
        self.pool
    }

    fn is_pool_token(&self, _: &Chain, token: Address) -> bool {
        self.tokens.is_pool_token(token)
    }

    fn resolve(&self, _: &Chain, from: Address, to: Address) -> Option<(u8, u8)> {
        let (i, j) = self.tokens.indices(from, to)?;
        Some((narrow(i).ok()?, narrow(j).ok()?))
    }

    fn quote(&self, chain: &Chain, (i, j): (u8, u8), amount_in: Amount) -> Result<Amount> {
        let out = chain.call::<SaddlePool, _, _>(self.pool, |p, ledger| p.calculate_swap(ledger, i, j, amount_in))?;
        Self::CORRECTION.apply(out)
    }

    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        route: (u8, u8),
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()> {
        let to = self
            .tokens
            .token_at(usize::from(route.1))
            .ok_or(AdapterError::TokenIndexOutOfRange)?;
        let deadline = chain.ledger().timestamp();
        let received = chain.call_mut::<SaddlePool, _, _>(self.pool, |p, ledger| {
            p.swap(ledger, custody, route, amount_in, Amount::ZERO, deadline)
        })?;
        chain.ledger_mut().transfer(to, custody, recipient, received)
    }
}
