//! Curve-style venues: plain coins and lending-wrapped coins.
//!
//! Both read `get_dy` and mark it down one smallest unit, which is what
//! `exchange` withholds.  The lending variant exposes the *underlying*
//! tokens: input is deposited into the lending market, the wrapped coins
//! are exchanged, and the output is redeemed before delivery.
//!
//! ```text
//! quote = withdraw( get_dy( deposit(dx) ) − 1 )
//! ```

use alloy_primitives::Address;

use super::{PoolAdapter, TokenResolver};
use crate::domain::{Amount, QuoteCorrection, Slot};
use crate::error::{AdapterError, Result};
use crate::host::Chain;
use crate::protocols::curve::CurvePool;
use crate::protocols::lending::LendingMarket;
use crate::traits::Venue;

/// Adapter over a plain Curve-style pool.
pub type CurveAdapter = PoolAdapter<CurvePlainVenue>;

/// Adapter over a Curve-style pool of lending wrappers.
pub type CurveLendingAdapter = PoolAdapter<CurveLendingVenue>;

fn signed(index: usize) -> Result<i128> {
    i128::try_from(index).map_err(|_| AdapterError::TokenIndexOutOfRange)
}

fn read_coins(chain: &Chain, pool: Address, token_count: usize) -> Result<Vec<Address>> {
    let contract = chain.contract::<CurvePool>(pool)?;
    (0..token_count)
        .map(|i| contract.coins(signed(i)?))
        .collect()
}

// ---------------------------------------------------------------------------
// Plain
// ---------------------------------------------------------------------------

/// Routes by `int128` coin index.
#[derive(Debug, Clone)]
pub struct CurvePlainVenue {
    pool: Address,
    tokens: TokenResolver,
}

impl CurvePlainVenue {
    /// Reads the first `token_count` coins of `pool`.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors and [`AdapterError::TokenIndexOutOfRange`]
    /// if the pool has fewer coins.
    pub fn new(chain: &Chain, pool: Address, token_count: usize) -> Result<Self> {
        Ok(Self {
            pool,
            tokens: TokenResolver::indexed(&read_coins(chain, pool, token_count)?),
        })
    }
}

impl Venue for CurvePlainVenue {
    type Route = (i128, i128);

    const PROTOCOL: &'static str = "stableswap-curve";
    const CORRECTION: QuoteCorrection = QuoteCorrection::SmallestUnit;

    fn pool(&self) -> Address {
        self.pool
    }

    fn is_pool_token(&self, _: &Chain, token: Address) -> bool {
        self.tokens.is_pool_token(token)
    }

    fn resolve(&self, _: &Chain, from: Address, to: Address) -> Option<(i128, i128)> {
        let (i, j) = self.tokens.indices(from, to)?;
        Some((signed(i).ok()?, signed(j).ok()?))
    }

    fn quote(&self, chain: &Chain, (i, j): (i128, i128), amount_in: Amount) -> Result<Amount> {
        let view = chain.call::<CurvePool, _, _>(self.pool, |p, ledger| p.get_dy(ledger, i, j, amount_in))?;
        Self::CORRECTION.apply(view)
    }

    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        route: (i128, i128),
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()> {
        let to = chain.contract::<CurvePool>(self.pool)?.coins(route.1)?;
        let received = chain.call_mut::<CurvePool, _, _>(self.pool, |p, ledger| {
            p.exchange(ledger, custody, route, amount_in, Amount::ZERO)
        })?;
        chain.ledger_mut().transfer(to, custody, recipient, received)
    }
}

// ---------------------------------------------------------------------------
// Lending-wrapped
// ---------------------------------------------------------------------------

/// Route between two underlying tokens through their wrapped coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedRoute {
    /// Coin index of the wrapped input.
    pub i: i128,
    /// Coin index of the wrapped output.
    pub j: i128,
    /// Underlying input token.
    pub underlying_in: Address,
    /// Underlying output token.
    pub underlying_out: Address,
    /// Wrapped output token.
    pub wrapped_out: Address,
}

/// Routes underlying tokens through a pool of lending wrappers.
#[derive(Debug, Clone)]
pub struct CurveLendingVenue {
    pool: Address,
    market: Address,
    tokens: TokenResolver,
}

impl CurveLendingVenue {
    /// Reads the first `token_count` coins of `pool` and maps each to its
    /// underlying token on `market`.
    ///
    /// # Errors
    ///
    /// - Lookup errors for `pool` or `market`.
    /// - [`AdapterError::InvalidConfiguration`] if a coin is not a wrapper
    ///   listed on `market`.
    pub fn new(chain: &Chain, pool: Address, market: Address, token_count: usize) -> Result<Self> {
        let lending = chain.contract::<LendingMarket>(market)?;
        let coins = read_coins(chain, pool, token_count)?
            .into_iter()
            .map(|wrapped| {
                lending
                    .underlying_of(wrapped)
                    .map(|underlying| (wrapped, underlying))
                    .ok_or(AdapterError::InvalidConfiguration(
                        "pool coin is not a listed lending wrapper",
                    ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pool,
            market,
            tokens: TokenResolver::wrapped(&coins),
        })
    }

    /// Lending market that issues the pool's coins.
    #[must_use]
    pub const fn market(&self) -> Address {
        self.market
    }
}

impl Venue for CurveLendingVenue {
    type Route = WrappedRoute;

    const PROTOCOL: &'static str = "stableswap-curve-lending";
    const CORRECTION: QuoteCorrection = QuoteCorrection::SmallestUnit;

    fn pool(&self) -> Address {
        self.pool
    }

    fn is_pool_token(&self, _: &Chain, token: Address) -> bool {
        self.tokens.is_pool_token(token)
    }

    fn resolve(&self, _: &Chain, from: Address, to: Address) -> Option<WrappedRoute> {
        match self.tokens.pair(from, to)? {
            (
                Slot::Wrapped {
                    index: i,
                    underlying: underlying_in,
                    ..
                },
                Slot::Wrapped {
                    index: j,
                    wrapped: wrapped_out,
                    underlying: underlying_out,
                },
            ) => Some(WrappedRoute {
                i: signed(i).ok()?,
                j: signed(j).ok()?,
                underlying_in,
                underlying_out,
                wrapped_out,
            }),
            _ => None,
        }
    }

    fn quote(&self, chain: &Chain, route: WrappedRoute, amount_in: Amount) -> Result<Amount> {
        let wrapped_in = chain.call::<LendingMarket, _, _>(self.market, |m, ledger| {
            m.preview_deposit(ledger, route.underlying_in, amount_in)
        })?;
        if wrapped_in.is_zero() {
            return Ok(Amount::ZERO);
        }
        let view = chain.call::<CurvePool, _, _>(self.pool, |p, ledger| {
            p.get_dy(ledger, route.i, route.j, wrapped_in)
        })?;
        let wrapped_out = Self::CORRECTION.apply(view)?;
        chain.call::<LendingMarket, _, _>(self.market, |m, ledger| {
            m.preview_withdraw(ledger, route.underlying_out, wrapped_out)
        })
    }

    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        route: WrappedRoute,
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()> {
        let wrapped_in = chain.call_mut::<LendingMarket, _, _>(self.market, |m, ledger| {
            m.deposit(ledger, custody, route.underlying_in, amount_in)
        })?;
        let wrapped_out = chain.call_mut::<CurvePool, _, _>(self.pool, |p, ledger| {
            p.exchange(ledger, custody, (route.i, route.j), wrapped_in, Amount::ZERO)
        })?;
        let received = chain.call_mut::<LendingMarket, _, _>(self.market, |m, ledger| {
            m.withdraw(ledger, custody, route.underlying_out, wrapped_out)
        })?;
        chain
            .ledger_mut()
            .transfer(route.underlying_out, custody, recipient, received)
    }
}
