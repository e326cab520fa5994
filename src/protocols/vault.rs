//! GMX-style multi-asset vault with oracle pricing.
//!
//! Swaps are priced from per-token oracle bounds rather than reserves: the
//! input is valued at its *minimum* price and the output at its *maximum*,
//! both with 30 decimals.
//!
//! ```text
//! amount_out = amount_in · min_price(in) / max_price(out)   (decimal-adjusted)
//! usdg       = amount_in · min_price(in) / 1e30             (18 decimals)
//! paid       = amount_out · (10000 − fee_bps) / 10000
//! ```
//!
//! The full `amount_out` leaves the pool; the fee stays in `fee_reserves`.
//! A swap reverts if the output pool, net of reserved amounts, cannot cover
//! `amount_out` or if the input token's USDG debt would exceed its cap.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::domain::{Amount, BasisPoints, Decimals, Rounding};
use crate::error::{AdapterError, Result};
use crate::host::{schedule, Chain, Ledger};
use crate::math::{mul_div, to_amount, CheckedArithmetic};

/// Oracle price precision (30 decimals).
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000_000;

/// Decimals of the vault's USD debt unit.
const USDG_DECIMALS: u8 = 18;

/// Default fee for swaps involving a volatile token.
pub const DEFAULT_SWAP_FEE: BasisPoints = BasisPoints::new(30);

/// Default fee for swaps between two stable tokens.
pub const DEFAULT_STABLE_SWAP_FEE: BasisPoints = BasisPoints::new(4);

/// Per-token vault state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultToken {
    /// Token decimals.
    pub decimals: Decimals,
    /// Whether the token is a stablecoin.
    pub is_stable: bool,
    /// Lower oracle price, 1e30 units.
    pub min_price: U256,
    /// Upper oracle price, 1e30 units.
    pub max_price: U256,
    /// Liquidity available for swaps.
    pub pool_amount: Amount,
    /// Liquidity reserved for open positions.
    pub reserved_amount: Amount,
    /// USD debt backed by this token, 18 decimals.
    pub usdg_amount: Amount,
    /// Debt cap; zero disables the cap.
    pub max_usdg_amount: Amount,
    /// Accrued swap fees.
    pub fee_reserves: Amount,
    /// Last recorded vault balance.
    pub token_balance: Amount,
}

/// Outcome of pricing a vault swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultQuote {
    /// Output before fees; this leaves the pool.
    pub amount_out: Amount,
    /// Output after fees; this reaches the receiver.
    pub amount_out_after_fees: Amount,
    /// USD debt moved from the output to the input token.
    pub usdg_amount: Amount,
}

/// An oracle-priced vault.
#[derive(Debug, Clone)]
pub struct Vault {
    address: Address,
    tokens: BTreeMap<Address, VaultToken>,
    whitelist: Vec<Address>,
    swap_fee: BasisPoints,
    stable_swap_fee: BasisPoints,
    is_swap_enabled: bool,
}

/// Rescales `amount` from `from` decimals to `to` decimals, rounding down.
fn adjust_for_decimals(amount: U256, from: Decimals, to: Decimals) -> Result<U256> {
    mul_div(
        amount,
        U256::from(to.factor()),
        U256::from(from.factor()),
        "decimal adjustment overflow",
    )
}

impl Vault {
    /// Creates an empty vault with default fees.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            tokens: BTreeMap::new(),
            whitelist: Vec::new(),
            swap_fee: DEFAULT_SWAP_FEE,
            stable_swap_fee: DEFAULT_STABLE_SWAP_FEE,
            is_swap_enabled: true,
        }
    }

    /// Deploys an empty vault on `chain`.
    ///
    /// # Errors
    ///
    /// Never fails in practice; kept fallible for uniformity with other deployers.
    pub fn deploy(chain: &mut Chain) -> Result<Address> {
        chain.deploy(|address, _| Ok(Self::new(address)))
    }

    /// Own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns `true` if `token` is configured.
    #[must_use]
    pub fn is_whitelisted(&self, token: Address) -> bool {
        self.tokens.contains_key(&token)
    }

    /// Configured tokens in listing order.
    #[must_use]
    pub fn whitelisted_tokens(&self) -> &[Address] {
        &self.whitelist
    }

    /// State of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] if `token` is not configured.
    pub fn token(&self, token: Address) -> Result<&VaultToken> {
        self.tokens.get(&token).ok_or(AdapterError::UnknownToken(token))
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut VaultToken> {
        self.tokens
            .get_mut(&token)
            .ok_or(AdapterError::UnknownToken(token))
    }

    /// Returns `true` while swaps are enabled.
    #[must_use]
    pub const fn is_swap_enabled(&self) -> bool {
        self.is_swap_enabled
    }

    /// Enables or disables swaps.
    pub fn set_is_swap_enabled(&mut self, enabled: bool) {
        self.is_swap_enabled = enabled;
    }

    /// Sets the swap fees.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] for a fee above 100%.
    pub fn set_fees(&mut self, swap_fee: BasisPoints, stable_swap_fee: BasisPoints) -> Result<()> {
        if !swap_fee.is_valid_percent() || !stable_swap_fee.is_valid_percent() {
            return Err(AdapterError::InvalidConfiguration("fee above 100%"));
        }
        self.swap_fee = swap_fee;
        self.stable_swap_fee = stable_swap_fee;
        Ok(())
    }

    /// Configures `token`, reading its decimals from the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] if `token` is unregistered.
    pub fn set_token_config(
        &mut self,
        ledger: &Ledger,
        token: Address,
        is_stable: bool,
        max_usdg_amount: Amount,
    ) -> Result<()> {
        let decimals = ledger.token(token)?.decimals();
        if let Some(existing) = self.tokens.get_mut(&token) {
            existing.is_stable = is_stable;
            existing.max_usdg_amount = max_usdg_amount;
            return Ok(());
        }
        self.tokens.insert(
            token,
            VaultToken {
                decimals,
                is_stable,
                min_price: U256::ZERO,
                max_price: U256::ZERO,
                pool_amount: Amount::ZERO,
                reserved_amount: Amount::ZERO,
                usdg_amount: Amount::ZERO,
                max_usdg_amount,
                fee_reserves: Amount::ZERO,
                token_balance: Amount::ZERO,
            },
        );
        self.whitelist.push(token);
        Ok(())
    }

    /// Sets the oracle bounds of `token`, 1e30 units.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::UnknownToken`] if `token` is not configured.
    /// - [`AdapterError::InvalidConfiguration`] if `min` is zero or above `max`.
    pub fn set_price(&mut self, token: Address, min: U256, max: U256) -> Result<()> {
        if min.is_zero() || min > max {
            return Err(AdapterError::InvalidConfiguration(
                "price bounds must satisfy 0 < min <= max",
            ));
        }
        let state = self.token_mut(token)?;
        state.min_price = min;
        state.max_price = max;
        Ok(())
    }

    /// Reserves `amount` of `token` for positions, removing it from swap
    /// liquidity.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InsufficientLiquidity`] beyond the pool amount.
    pub fn set_reserved_amount(&mut self, token: Address, amount: Amount) -> Result<()> {
        let state = self.token_mut(token)?;
        if amount > state.pool_amount {
            return Err(AdapterError::InsufficientLiquidity);
        }
        state.reserved_amount = amount;
        Ok(())
    }

    /// Adds any unrecorded balance of `token` to its pool amount.
    ///
    /// # Errors
    ///
    /// Returns lookup errors or [`AdapterError::InvalidAmount`] if nothing arrived.
    pub fn direct_pool_deposit(&mut self, ledger: &Ledger, token: Address) -> Result<Amount> {
        let received = self.transfer_in(ledger, token)?;
        let state = self.token_mut(token)?;
        state.pool_amount = state.pool_amount.safe_add(&received)?;
        Ok(received)
    }

    fn transfer_in(&mut self, ledger: &Ledger, token: Address) -> Result<Amount> {
        let balance = ledger.balance_of(token, self.address)?;
        let state = self.token_mut(token)?;
        let received = balance
            .checked_sub(&state.token_balance)
            .ok_or(AdapterError::Underflow("vault balance below record"))?;
        if received.is_zero() {
            return Err(AdapterError::InvalidAmount("no tokens received"));
        }
        state.token_balance = balance;
        Ok(received)
    }

    fn fee_for(&self, token_in: &VaultToken, token_out: &VaultToken) -> BasisPoints {
        if token_in.is_stable && token_out.is_stable {
            self.stable_swap_fee
        } else {
            self.swap_fee
        }
    }

    fn price_swap(&self, token_in: Address, token_out: Address, amount_in: Amount) -> Result<VaultQuote> {
        if !self.is_swap_enabled {
            return Err(AdapterError::SwapsDisabled("vault swaps disabled"));
        }
        if token_in == token_out {
            return Err(AdapterError::InvalidConfiguration("same token"));
        }
        let (a, b) = (self.token(token_in)?, self.token(token_out)?);
        if a.min_price.is_zero() || b.max_price.is_zero() {
            return Err(AdapterError::InvalidConfiguration("price not set"));
        }

        let out = mul_div(amount_in.to_u256(), a.min_price, b.max_price, "amount out overflow")?;
        let amount_out = to_amount(
            adjust_for_decimals(out, a.decimals, b.decimals)?,
            "amount out overflow",
        )?;
        let usd = mul_div(
            amount_in.to_u256(),
            a.min_price,
            U256::from(PRICE_PRECISION),
            "usdg overflow",
        )?;
        let usdg_amount = to_amount(
            adjust_for_decimals(usd, a.decimals, Decimals::new(USDG_DECIMALS)?)?,
            "usdg overflow",
        )?;
        let amount_out_after_fees = self.fee_for(a, b).retain(amount_out, Rounding::Down)?;

        let available = b
            .pool_amount
            .checked_sub(&b.reserved_amount)
            .unwrap_or(Amount::ZERO);
        if amount_out > available {
            return Err(AdapterError::InsufficientLiquidity);
        }
        let new_debt = a.usdg_amount.safe_add(&usdg_amount)?;
        if !a.max_usdg_amount.is_zero() && new_debt > a.max_usdg_amount {
            return Err(AdapterError::MaxUsdgExceeded(token_in));
        }
        Ok(VaultQuote {
            amount_out,
            amount_out_after_fees,
            usdg_amount,
        })
    }

    /// Output reaching the receiver for swapping `amount_in` of `token_in`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::SwapsDisabled`] when swaps are off.
    /// - [`AdapterError::UnknownToken`] for an unconfigured token.
    /// - [`AdapterError::InsufficientLiquidity`] if the output pool is short.
    /// - [`AdapterError::MaxUsdgExceeded`] if the input debt cap would be crossed.
    pub fn get_amount_out(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> Result<Amount> {
        ledger.charge(schedule::SLOAD.times(6));
        Ok(self.price_swap(token_in, token_out, amount_in)?.amount_out_after_fees)
    }

    /// Swaps whatever `token_in` arrived since the last recorded balance
    /// into `token_out`, paid to `receiver`.
    ///
    /// # Errors
    ///
    /// As [`Vault::get_amount_out`], plus [`AdapterError::InvalidAmount`] if
    /// no input arrived.
    pub fn swap(
        &mut self,
        ledger: &mut Ledger,
        token_in: Address,
        token_out: Address,
        receiver: Address,
    ) -> Result<Amount> {
        let amount_in = self.transfer_in(ledger, token_in)?;
        ledger.charge(schedule::SLOAD.times(6));
        let quote = self.price_swap(token_in, token_out, amount_in)?;
        let fee = quote
            .amount_out
            .checked_sub(&quote.amount_out_after_fees)
            .ok_or(AdapterError::Underflow("fee exceeds output"))?;

        let a = self.token_mut(token_in)?;
        a.usdg_amount = a.usdg_amount.safe_add(&quote.usdg_amount)?;
        a.pool_amount = a.pool_amount.safe_add(&amount_in)?;

        let b = self.token_mut(token_out)?;
        b.usdg_amount = b.usdg_amount.checked_sub(&quote.usdg_amount).unwrap_or(Amount::ZERO);
        b.pool_amount = b.pool_amount.safe_sub(&quote.amount_out)?;
        b.fee_reserves = b.fee_reserves.safe_add(&fee)?;
        ledger.charge(schedule::SSTORE.times(5));

        ledger.transfer(token_out, self.address, receiver, quote.amount_out_after_fees)?;
        let b = self.token_mut(token_out)?;
        b.token_balance = b.token_balance.safe_sub(&quote.amount_out_after_fees)?;
        debug!(
            vault = %self.address,
            %token_in,
            %token_out,
            %amount_in,
            amount_out = %quote.amount_out_after_fees,
            %fee,
            "vault swap"
        );
        Ok(quote.amount_out_after_fees)
    }
}
