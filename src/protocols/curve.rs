//! Curve-style StableSwap pool with `int128` coin indices.
//!
//! `get_dy` prices a trade exactly as the invariant dictates, but
//! `exchange` keeps one smallest unit of the output coin in the pool as a
//! settlement buffer.  Callers that need the exact delivered figure must
//! subtract one unit from the view.

use alloy_primitives::Address;
use tracing::debug;

use super::stableswap::{StableSwapCore, FEE_DENOMINATOR};
use super::CoinList;
use crate::domain::{Amount, Token};
use crate::error::{AdapterError, Result};
use crate::host::{Chain, Ledger};

/// A StableSwap pool addressed by signed coin index.
#[derive(Debug, Clone)]
pub struct CurvePool {
    address: Address,
    core: StableSwapCore,
    fee: u64,
    is_killed: bool,
}

fn index(i: i128) -> Result<usize> {
    usize::try_from(i).map_err(|_| AdapterError::TokenIndexOutOfRange)
}

impl CurvePool {
    /// Creates a pool over `tokens` with amplification `amp` and a fee in
    /// 1e10 units.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] for a fee of 100% or
    /// more, or any invalid core parameter.
    pub fn new(address: Address, tokens: &[Token], amp: u64, fee: u64) -> Result<Self> {
        if fee >= FEE_DENOMINATOR {
            return Err(AdapterError::InvalidConfiguration("fee must be below 100%"));
        }
        Ok(Self {
            address,
            core: StableSwapCore::new(tokens, amp)?,
            fee,
            is_killed: false,
        })
    }

    /// Deploys a pool on `chain`.
    ///
    /// # Errors
    ///
    /// Same as [`CurvePool::new`].
    pub fn deploy(chain: &mut Chain, tokens: &[Token], amp: u64, fee: u64) -> Result<Address> {
        chain.deploy(|address, _| Self::new(address, tokens, amp, fee))
    }

    /// Own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Coin at index `i`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] for a negative index or
    /// one past the last coin.
    pub fn coins(&self, i: i128) -> Result<Address> {
        self.core.coin(index(i)?)
    }

    /// Pool balance of coin `i`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] for a bad index.
    pub fn balances(&self, i: i128) -> Result<Amount> {
        self.core.balance(index(i)?)
    }

    /// Fee in 1e10 units.
    #[must_use]
    pub const fn fee(&self) -> u64 {
        self.fee
    }

    /// Stops or resumes exchanges.
    pub fn kill(&mut self, killed: bool) {
        self.is_killed = killed;
    }

    /// Output of exchanging `dx` of coin `i` for coin `j`, before the
    /// settlement buffer.
    ///
    /// # Errors
    ///
    /// Returns index, liquidity and solver errors.
    pub fn get_dy(&self, ledger: &Ledger, i: i128, j: i128, dx: Amount) -> Result<Amount> {
        let (i, j) = (index(i)?, index(j)?);
        if dx.is_zero() {
            self.core.coin(i)?;
            self.core.coin(j)?;
            return Ok(Amount::ZERO);
        }
        let raw = self.core.price(ledger, i, j, dx)?;
        self.core.to_raw_after_fee(j, raw.dy_xp, self.fee)
    }

    /// Exchanges `dx` of coin `i` held by `caller` for coin `j`, paid to
    /// `caller`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::SwapsDisabled`] once killed.
    /// - [`AdapterError::InsufficientOutput`] below `min_dy`.
    /// - Index, liquidity and ledger errors.
    pub fn exchange(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        (i, j): (i128, i128),
        dx: Amount,
        min_dy: Amount,
    ) -> Result<Amount> {
        if self.is_killed {
            return Err(AdapterError::SwapsDisabled("pool killed"));
        }
        let view = self.get_dy(ledger, i, j, dx)?;
        let dy = view.checked_sub(&Amount::ONE).unwrap_or(Amount::ZERO);
        if dy < min_dy || dy.is_zero() {
            return Err(AdapterError::InsufficientOutput {
                amount_out: dy,
                min_out: min_dy,
            });
        }
        let pool = self.address;
        self.core
            .settle(ledger, pool, caller, (index(i)?, dx), (index(j)?, dy))?;
        debug!(%pool, i, j, %dx, %dy, "curve exchange");
        Ok(dy)
    }

    /// Deposits one amount per coin from `provider`.
    ///
    /// # Errors
    ///
    /// See [`StableSwapCore::add_liquidity`].
    pub fn add_liquidity(
        &mut self,
        ledger: &mut Ledger,
        provider: Address,
        amounts: &[Amount],
    ) -> Result<()> {
        let pool = self.address;
        self.core.add_liquidity(ledger, pool, provider, amounts)
    }
}

impl CoinList for CurvePool {
    fn coin_at(&self, index: usize) -> Result<Address> {
        self.core.coin(index)
    }
}
