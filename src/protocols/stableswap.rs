//! Balance bookkeeping and pricing shared by the StableSwap-family pools.
//!
//! Each coin carries a *rate*: the factor (scaled by 1e18) that lifts one
//! raw unit to the pool's normalised precision.  For a plain pool the
//! rate is `10^(18 − decimals) · 1e18`; a crypto pool folds its price
//! scale into the rate as well.
//!
//! ```text
//! xp[k] = balance[k] · rate[k] / 1e18
//! dy_xp = xp[j] − get_y(i, j, xp[i] + dx·rate[i]/1e18) − 1
//! dy    = (dy_xp − fee(dy_xp)) · 1e18 / rate[j]
//! ```

use alloy_primitives::{Address, U256};

use crate::domain::{Amount, Token};
use crate::error::{AdapterError, Result};
use crate::host::{schedule, Ledger};
use crate::math::stableswap::compute_y;
use crate::math::{add, mul, mul_div, sub, to_amount, CheckedArithmetic};

/// Denominator of StableSwap fee parameters (1e10 = 100%).
pub const FEE_DENOMINATOR: u64 = 10_000_000_000;

/// Fixed-point unit for rates and price scales.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Supported coin counts.
const MIN_COINS: usize = 2;
const MAX_COINS: usize = 8;

/// Upper bound of the amplification coefficient.
const MAX_AMP: u64 = 1_000_000;

/// Result of pricing a trade before fees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSwap {
    /// Output in normalised units, before fees.
    pub dy_xp: U256,
    /// Normalised balances before the trade.
    pub xp_before: Vec<U256>,
    /// Normalised balances after the trade, before fees leave the pool.
    pub xp_after: Vec<U256>,
}

/// Coins, rates and balances of a StableSwap-family pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableSwapCore {
    coins: Vec<Address>,
    rates: Vec<U256>,
    balances: Vec<Amount>,
    amp: u64,
}

impl StableSwapCore {
    /// Creates a core with plain decimal-normalising rates.
    ///
    /// # Errors
    ///
    /// See [`StableSwapCore::with_rates`].
    pub fn new(tokens: &[Token], amp: u64) -> Result<Self> {
        let rates = tokens
            .iter()
            .map(|t| {
                mul(
                    U256::from(t.decimals().precision_multiplier()),
                    U256::from(PRECISION),
                    "rate overflow",
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Self::with_rates(tokens, rates, amp)
    }

    /// Creates a core with explicit per-coin rates.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] if the coin count is
    /// outside `2..=8`, coins repeat, a rate is zero, the rate list length
    /// differs, or `amp` is outside `1..=1_000_000`.
    pub fn with_rates(tokens: &[Token], rates: Vec<U256>, amp: u64) -> Result<Self> {
        if tokens.len() < MIN_COINS || tokens.len() > MAX_COINS {
            return Err(AdapterError::InvalidConfiguration(
                "pool must hold between 2 and 8 coins",
            ));
        }
        if rates.len() != tokens.len() || rates.iter().any(|r| r.is_zero()) {
            return Err(AdapterError::InvalidConfiguration(
                "one non-zero rate per coin required",
            ));
        }
        if amp == 0 || amp > MAX_AMP {
            return Err(AdapterError::InvalidConfiguration(
                "amplification must be in 1..=1_000_000",
            ));
        }
        let coins: Vec<Address> = tokens.iter().map(Token::address).collect();
        for (k, coin) in coins.iter().enumerate() {
            if coins[..k].contains(coin) {
                return Err(AdapterError::InvalidConfiguration("duplicate coin"));
            }
        }
        Ok(Self {
            balances: vec![Amount::ZERO; coins.len()],
            coins,
            rates,
            amp,
        })
    }

    /// Number of coins.
    #[must_use]
    pub fn n_coins(&self) -> usize {
        self.coins.len()
    }

    /// Coin addresses in index order.
    #[must_use]
    pub fn coins(&self) -> &[Address] {
        &self.coins
    }

    /// Coin at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] past the last coin.
    pub fn coin(&self, index: usize) -> Result<Address> {
        self.coins
            .get(index)
            .copied()
            .ok_or(AdapterError::TokenIndexOutOfRange)
    }

    /// Index of `token`, if it is a coin.
    #[must_use]
    pub fn index_of(&self, token: Address) -> Option<usize> {
        self.coins.iter().position(|c| *c == token)
    }

    /// Pool balance of coin `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] past the last coin.
    pub fn balance(&self, index: usize) -> Result<Amount> {
        self.balances
            .get(index)
            .copied()
            .ok_or(AdapterError::TokenIndexOutOfRange)
    }

    /// Amplification coefficient.
    #[must_use]
    pub const fn amp(&self) -> u64 {
        self.amp
    }

    pub(crate) fn set_rate(&mut self, index: usize, rate: U256) -> Result<()> {
        if rate.is_zero() {
            return Err(AdapterError::InvalidConfiguration("rate must be non-zero"));
        }
        let slot = self
            .rates
            .get_mut(index)
            .ok_or(AdapterError::TokenIndexOutOfRange)?;
        *slot = rate;
        Ok(())
    }

    /// Normalised balances.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] for balances beyond 256 bits once scaled.
    pub fn xp(&self) -> Result<Vec<U256>> {
        self.balances
            .iter()
            .zip(&self.rates)
            .map(|(b, r)| mul_div(b.to_u256(), *r, U256::from(PRECISION), "xp overflow"))
            .collect()
    }

    /// Prices a trade of `dx` of coin `i` into coin `j`, before fees.
    ///
    /// Charges one storage read per coin plus one solver step per
    /// Newton-Raphson iteration.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::TokenIndexOutOfRange`] for bad indices.
    /// - [`AdapterError::InsufficientLiquidity`] if the pool cannot pay.
    /// - Solver errors from [`compute_y`].
    pub fn price(&self, ledger: &Ledger, i: usize, j: usize, dx: Amount) -> Result<RawSwap> {
        if i == j || i >= self.n_coins() || j >= self.n_coins() {
            return Err(AdapterError::TokenIndexOutOfRange);
        }
        ledger.charge(schedule::SLOAD.times(self.n_coins() as u64));
        let xp = self.xp()?;
        let dx_xp = mul_div(dx.to_u256(), self.rates[i], U256::from(PRECISION), "dx overflow")?;
        let x = add(xp[i], dx_xp, "x overflow")?;
        let solution = compute_y(i, j, x, &xp, U256::from(self.amp))?;
        ledger.charge(schedule::NEWTON_STEP.times(u64::from(solution.iterations)));

        let y_plus_one = add(solution.value, U256::from(1u8), "y overflow")?;
        if y_plus_one > xp[j] {
            return Err(AdapterError::InsufficientLiquidity);
        }
        let dy_xp = sub(xp[j], y_plus_one, "dy underflow")?;
        let mut xp_after = xp.clone();
        xp_after[i] = x;
        xp_after[j] = solution.value;
        Ok(RawSwap {
            dy_xp,
            xp_before: xp,
            xp_after,
        })
    }

    /// Deducts a fee of `fee / 1e10` from a normalised output and converts
    /// it to raw units of coin `j`.
    ///
    /// # Errors
    ///
    /// Returns arithmetic errors only.
    pub fn to_raw_after_fee(&self, j: usize, dy_xp: U256, fee: u64) -> Result<Amount> {
        let rate = *self
            .rates
            .get(j)
            .ok_or(AdapterError::TokenIndexOutOfRange)?;
        let fee_xp = mul_div(
            dy_xp,
            U256::from(fee),
            U256::from(FEE_DENOMINATOR),
            "fee overflow",
        )?;
        let net = sub(dy_xp, fee_xp, "fee exceeds output")?;
        to_amount(
            mul_div(net, U256::from(PRECISION), rate, "dy overflow")?,
            "dy overflow",
        )
    }

    /// Pulls `amounts` from `provider` into the pool.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] if the amount list
    /// length differs from the coin count, or ledger errors.
    pub fn add_liquidity(
        &mut self,
        ledger: &mut Ledger,
        pool: Address,
        provider: Address,
        amounts: &[Amount],
    ) -> Result<()> {
        if amounts.len() != self.n_coins() {
            return Err(AdapterError::InvalidConfiguration(
                "one amount per coin required",
            ));
        }
        for (k, amount) in amounts.iter().enumerate() {
            if amount.is_zero() {
                continue;
            }
            ledger.transfer(self.coins[k], provider, pool, *amount)?;
            self.balances[k] = self.balances[k].safe_add(amount)?;
        }
        ledger.charge(schedule::SSTORE.times(self.n_coins() as u64));
        Ok(())
    }

    /// Moves `dx` of coin `i` from `trader` into the pool and `dy` of coin
    /// `j` from the pool to `trader`, updating balances.
    ///
    /// # Errors
    ///
    /// Returns ledger errors or [`AdapterError::InsufficientLiquidity`].
    pub fn settle(
        &mut self,
        ledger: &mut Ledger,
        pool: Address,
        trader: Address,
        (i, dx): (usize, Amount),
        (j, dy): (usize, Amount),
    ) -> Result<()> {
        let remaining = self.balances[j]
            .checked_sub(&dy)
            .ok_or(AdapterError::InsufficientLiquidity)?;
        ledger.transfer(self.coins[i], trader, pool, dx)?;
        ledger.transfer(self.coins[j], pool, trader, dy)?;
        self.balances[i] = self.balances[i].safe_add(&dx)?;
        self.balances[j] = remaining;
        ledger.charge(schedule::SSTORE.times(2));
        Ok(())
    }
}
