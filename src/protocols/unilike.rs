//! Constant-product factory and pair (Uniswap V2 style).
//!
//! The pair's invariant is `x · y = k`.  A swap is *optimistic*: the
//! caller transfers input to the pair first, the pair pays out the
//! requested amounts, then verifies from its own balances that
//!
//! ```text
//! (b0·1000 − in0·fee) · (b1·1000 − in1·fee) ≥ r0 · r1 · 1000²
//! ```
//!
//! where `fee` is in thousandths (3 = 0.3%).
//!
//! Pricing for an exact input follows the same fee convention:
//!
//! ```text
//! amount_out = in·(1000 − fee)·r_out / (r_in·1000 + in·(1000 − fee))
//! ```

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::domain::{Amount, TokenPair};
use crate::error::{AdapterError, Result};
use crate::host::{schedule, Chain, Ledger};
use crate::math::{add, mul, mul_div, sub, to_amount};

/// Fee denominator: fees are expressed in thousandths.
pub const FEE_DENOMINATOR: u32 = 1_000;

/// Computes the output for an exact input against the given reserves.
///
/// Returns zero when either reserve is empty.
///
/// # Errors
///
/// - [`AdapterError::InvalidConfiguration`] if `fee_per_mille` is 1000 or more.
/// - [`AdapterError::Overflow`] if an intermediate exceeds 256 bits.
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_per_mille: u32,
) -> Result<Amount> {
    if fee_per_mille >= FEE_DENOMINATOR {
        return Err(AdapterError::InvalidConfiguration(
            "fee must be below 1000 thousandths",
        ));
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(Amount::ZERO);
    }
    let in_with_fee = mul(
        amount_in.to_u256(),
        U256::from(FEE_DENOMINATOR - fee_per_mille),
        "amount in with fee overflow",
    )?;
    let denominator = add(
        mul(
            reserve_in.to_u256(),
            U256::from(FEE_DENOMINATOR),
            "reserve in overflow",
        )?,
        in_with_fee,
        "denominator overflow",
    )?;
    let out = mul_div(
        in_with_fee,
        reserve_out.to_u256(),
        denominator,
        "numerator overflow",
    )?;
    to_amount(out, "amount out overflow")
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Registry of pairs, one per unordered token pair.
#[derive(Debug, Clone)]
pub struct UnilikeFactory {
    address: Address,
    fee_per_mille: u32,
    pairs: BTreeMap<TokenPair, Address>,
    all_pairs: Vec<Address>,
}

impl UnilikeFactory {
    /// Creates an empty factory whose pairs charge `fee_per_mille`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] if the fee is 1000
    /// thousandths or more.
    pub fn new(address: Address, fee_per_mille: u32) -> Result<Self> {
        if fee_per_mille >= FEE_DENOMINATOR {
            return Err(AdapterError::InvalidConfiguration(
                "fee must be below 1000 thousandths",
            ));
        }
        Ok(Self {
            address,
            fee_per_mille,
            pairs: BTreeMap::new(),
            all_pairs: Vec::new(),
        })
    }

    /// Deploys a factory on `chain`.
    ///
    /// # Errors
    ///
    /// Same as [`UnilikeFactory::new`].
    pub fn deploy(chain: &mut Chain, fee_per_mille: u32) -> Result<Address> {
        chain.deploy(|address, _| Self::new(address, fee_per_mille))
    }

    /// Own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Fee charged by every pair of this factory, in thousandths.
    #[must_use]
    pub const fn fee_per_mille(&self) -> u32 {
        self.fee_per_mille
    }

    /// Returns the pair trading `a` against `b`, in either order.
    #[must_use]
    pub fn get_pair(&self, a: Address, b: Address) -> Option<Address> {
        let key = TokenPair::new(a, b).ok()?;
        self.pairs.get(&key).copied()
    }

    /// Number of pairs created.
    #[must_use]
    pub fn all_pairs_length(&self) -> usize {
        self.all_pairs.len()
    }

    /// Pair at creation index `index`.
    #[must_use]
    pub fn all_pairs(&self, index: usize) -> Option<Address> {
        self.all_pairs.get(index).copied()
    }

    /// Returns `true` if any pair trades `token`.
    #[must_use]
    pub fn lists_token(&self, token: Address) -> bool {
        self.pairs.keys().any(|pair| pair.contains(token))
    }

    fn register(&mut self, key: TokenPair, pair: Address) -> Result<()> {
        if self.pairs.contains_key(&key) {
            return Err(AdapterError::InvalidConfiguration("pair exists"));
        }
        self.pairs.insert(key, pair);
        self.all_pairs.push(pair);
        Ok(())
    }
}

/// Creates a pair for `a`/`b` under `factory`.
///
/// # Errors
///
/// - [`AdapterError::InvalidConfiguration`] if the tokens are equal or the
///   pair already exists.
/// - [`AdapterError::UnknownToken`] if either token is unregistered.
pub fn create_pair(chain: &mut Chain, factory: Address, a: Address, b: Address) -> Result<Address> {
    let key = TokenPair::new(a, b)?;
    chain.ledger().token(key.token0())?;
    chain.ledger().token(key.token1())?;
    let (fee, existing) = chain.call::<UnilikeFactory, _, _>(factory, |f, _| {
        Ok((f.fee_per_mille(), f.get_pair(a, b)))
    })?;
    if existing.is_some() {
        return Err(AdapterError::InvalidConfiguration("pair exists"));
    }
    chain.atomic(|chain| {
        let pair = chain.deploy(|address, _| Ok(UnilikePair::new(address, factory, key, fee)))?;
        chain.call_mut::<UnilikeFactory, _, _>(factory, |f, _| f.register(key, pair))?;
        debug!(%factory, %pair, token0 = %key.token0(), token1 = %key.token1(), "pair created");
        Ok(pair)
    })
}

/// Mints `amount0`/`amount1` straight into `pair` and syncs its reserves.
///
/// # Errors
///
/// Propagates ledger and lookup errors.
pub fn provide_liquidity(
    chain: &mut Chain,
    pair: Address,
    amount0: Amount,
    amount1: Amount,
) -> Result<()> {
    let (token0, token1) = chain.call::<UnilikePair, _, _>(pair, |p, _| Ok((p.token0(), p.token1())))?;
    chain.atomic(|chain| {
        chain.ledger_mut().mint(token0, pair, amount0)?;
        chain.ledger_mut().mint(token1, pair, amount1)?;
        chain.call_mut::<UnilikePair, _, _>(pair, |p, ledger| p.sync(ledger))
    })
}

// ---------------------------------------------------------------------------
// Pair
// ---------------------------------------------------------------------------

/// A constant-product pair holding two tokens.
#[derive(Debug, Clone)]
pub struct UnilikePair {
    address: Address,
    factory: Address,
    tokens: TokenPair,
    reserve0: Amount,
    reserve1: Amount,
    fee_per_mille: u32,
}

impl UnilikePair {
    fn new(address: Address, factory: Address, tokens: TokenPair, fee_per_mille: u32) -> Self {
        Self {
            address,
            factory,
            tokens,
            reserve0: Amount::ZERO,
            reserve1: Amount::ZERO,
            fee_per_mille,
        }
    }

    /// Own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Factory that created the pair.
    #[must_use]
    pub const fn factory(&self) -> Address {
        self.factory
    }

    /// Lower-address token.
    #[must_use]
    pub const fn token0(&self) -> Address {
        self.tokens.token0()
    }

    /// Higher-address token.
    #[must_use]
    pub const fn token1(&self) -> Address {
        self.tokens.token1()
    }

    /// Cached reserves `(reserve0, reserve1)`.
    #[must_use]
    pub fn get_reserves(&self, ledger: &Ledger) -> (Amount, Amount) {
        ledger.charge(schedule::SLOAD);
        (self.reserve0, self.reserve1)
    }

    /// Pays `amount0_out`/`amount1_out` to `to`, then checks the fee-adjusted
    /// invariant against the pair's actual balances.
    ///
    /// Input must already have been transferred to the pair.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InsufficientOutput`] if both outputs are zero.
    /// - [`AdapterError::InsufficientLiquidity`] if an output reaches its reserve.
    /// - [`AdapterError::InvalidConfiguration`] if `to` is one of the pair's tokens.
    /// - [`AdapterError::InvalidAmount`] if no input arrived.
    /// - [`AdapterError::InvariantViolation`] if `k` decreased.
    pub fn swap(
        &mut self,
        ledger: &mut Ledger,
        amount0_out: Amount,
        amount1_out: Amount,
        to: Address,
    ) -> Result<()> {
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(AdapterError::InsufficientOutput {
                amount_out: Amount::ZERO,
                min_out: Amount::ONE,
            });
        }
        if amount0_out >= self.reserve0 || amount1_out >= self.reserve1 {
            return Err(AdapterError::InsufficientLiquidity);
        }
        if self.tokens.contains(to) {
            return Err(AdapterError::InvalidConfiguration("invalid swap recipient"));
        }

        if !amount0_out.is_zero() {
            ledger.transfer(self.token0(), self.address, to, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            ledger.transfer(self.token1(), self.address, to, amount1_out)?;
        }
        let balance0 = ledger.balance_of(self.token0(), self.address)?;
        let balance1 = ledger.balance_of(self.token1(), self.address)?;

        let amount0_in = amount_in(balance0, self.reserve0, amount0_out);
        let amount1_in = amount_in(balance1, self.reserve1, amount1_out);
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(AdapterError::InvalidAmount("insufficient input amount"));
        }

        let thousand = U256::from(FEE_DENOMINATOR);
        let fee = U256::from(self.fee_per_mille);
        let adjusted0 = sub(
            mul(balance0.to_u256(), thousand, "K: balance0 overflow")?,
            mul(amount0_in.to_u256(), fee, "K: fee0 overflow")?,
            "K: adjusted0 underflow",
        )?;
        let adjusted1 = sub(
            mul(balance1.to_u256(), thousand, "K: balance1 overflow")?,
            mul(amount1_in.to_u256(), fee, "K: fee1 overflow")?,
            "K: adjusted1 underflow",
        )?;
        let k_after = mul(adjusted0, adjusted1, "K: product overflow")?;
        let k_before = mul(
            mul(self.reserve0.to_u256(), self.reserve1.to_u256(), "K: reserves overflow")?,
            mul(thousand, thousand, "K: scale overflow")?,
            "K: reserves overflow",
        )?;
        if k_after < k_before {
            return Err(AdapterError::InvariantViolation("K"));
        }

        self.update(ledger, balance0, balance1);
        Ok(())
    }

    /// Forces reserves to match balances.
    ///
    /// # Errors
    ///
    /// Propagates ledger lookup errors.
    pub fn sync(&mut self, ledger: &mut Ledger) -> Result<()> {
        let balance0 = ledger.balance_of(self.token0(), self.address)?;
        let balance1 = ledger.balance_of(self.token1(), self.address)?;
        self.update(ledger, balance0, balance1);
        Ok(())
    }

    fn update(&mut self, ledger: &Ledger, balance0: Amount, balance1: Amount) {
        ledger.charge(schedule::SSTORE);
        self.reserve0 = balance0;
        self.reserve1 = balance1;
    }
}

fn amount_in(balance: Amount, reserve: Amount, out: Amount) -> Amount {
    let floor = reserve.checked_sub(&out).unwrap_or(Amount::ZERO);
    balance.checked_sub(&floor).unwrap_or(Amount::ZERO)
}
