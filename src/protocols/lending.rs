//! Lending market minting interest-bearing wrappers of underlying tokens.
//!
//! Each listed reserve pairs an underlying token with a wrapped token of
//! the same decimals.  The exchange rate (underlying per wrapped, 1e18
//! units) only grows; both conversions round down in the market's favour.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

use super::stableswap::PRECISION;
use crate::domain::{Amount, Token};
use crate::error::{AdapterError, Result};
use crate::host::{schedule, Chain, Ledger};
use crate::math::{mul_div, to_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reserve {
    wrapped: Address,
    rate: U256,
}

/// An Aave-style market.
#[derive(Debug, Clone, Default)]
pub struct LendingMarket {
    address: Address,
    reserves: BTreeMap<Address, Reserve>,
}

impl LendingMarket {
    /// Creates a market with no reserves.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            reserves: BTreeMap::new(),
        }
    }

    /// Deploys an empty market on `chain`.
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

    /// Underlying token of `wrapped`, if listed.
    #[must_use]
    pub fn underlying_of(&self, wrapped: Address) -> Option<Address> {
        self.reserves
            .iter()
            .find(|(_, r)| r.wrapped == wrapped)
            .map(|(u, _)| *u)
    }

    /// Wrapped token of `underlying`, if listed.
    #[must_use]
    pub fn wrapped_of(&self, underlying: Address) -> Option<Address> {
        self.reserves.get(&underlying).map(|r| r.wrapped)
    }

    fn reserve(&self, underlying: Address) -> Result<Reserve> {
        self.reserves
            .get(&underlying)
            .copied()
            .ok_or(AdapterError::UnknownToken(underlying))
    }

    /// Current exchange rate of `underlying`'s reserve, 1e18 units.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] if the reserve is not listed.
    pub fn rate(&self, underlying: Address) -> Result<U256> {
        Ok(self.reserve(underlying)?.rate)
    }

    /// Raises the exchange rate of a reserve.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::UnknownToken`] if the reserve is not listed.
    /// - [`AdapterError::InvalidConfiguration`] if `rate` is below the current one.
    pub fn set_rate(&mut self, underlying: Address, rate: U256) -> Result<()> {
        let reserve = self
            .reserves
            .get_mut(&underlying)
            .ok_or(AdapterError::UnknownToken(underlying))?;
        if rate < reserve.rate {
            return Err(AdapterError::InvalidConfiguration("exchange rate cannot fall"));
        }
        reserve.rate = rate;
        Ok(())
    }

    /// Wrapped amount minted for depositing `amount` of `underlying`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] or arithmetic errors.
    pub fn preview_deposit(&self, ledger: &Ledger, underlying: Address, amount: Amount) -> Result<Amount> {
        ledger.charge(schedule::SLOAD);
        let reserve = self.reserve(underlying)?;
        to_amount(
            mul_div(amount.to_u256(), U256::from(PRECISION), reserve.rate, "deposit overflow")?,
            "deposit overflow",
        )
    }

    /// Underlying amount paid for redeeming `wrapped_amount` of `underlying`'s wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] or arithmetic errors.
    pub fn preview_withdraw(
        &self,
        ledger: &Ledger,
        underlying: Address,
        wrapped_amount: Amount,
    ) -> Result<Amount> {
        ledger.charge(schedule::SLOAD);
        let reserve = self.reserve(underlying)?;
        to_amount(
            mul_div(
                wrapped_amount.to_u256(),
                reserve.rate,
                U256::from(PRECISION),
                "withdraw overflow",
            )?,
            "withdraw overflow",
        )
    }

    /// Takes `amount` of `underlying` from `caller` and mints the wrapper
    /// to `caller`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidAmount`] if nothing would be minted.
    /// - Lookup and ledger errors.
    pub fn deposit(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        underlying: Address,
        amount: Amount,
    ) -> Result<Amount> {
        let minted = self.preview_deposit(ledger, underlying, amount)?;
        if minted.is_zero() {
            return Err(AdapterError::InvalidAmount("deposit mints nothing"));
        }
        let wrapped = self.reserve(underlying)?.wrapped;
        ledger.transfer(underlying, caller, self.address, amount)?;
        ledger.mint(wrapped, caller, minted)?;
        debug!(market = %self.address, %underlying, %amount, %minted, "deposit");
        Ok(minted)
    }

    /// Burns `wrapped_amount` of the wrapper from `caller` and pays the
    /// underlying to `caller`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InsufficientLiquidity`] if the market lacks the underlying.
    /// - Lookup and ledger errors.
    pub fn withdraw(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        underlying: Address,
        wrapped_amount: Amount,
    ) -> Result<Amount> {
        let paid = self.preview_withdraw(ledger, underlying, wrapped_amount)?;
        if ledger.balance_of(underlying, self.address)? < paid {
            return Err(AdapterError::InsufficientLiquidity);
        }
        let wrapped = self.reserve(underlying)?.wrapped;
        ledger.burn(wrapped, caller, wrapped_amount)?;
        ledger.transfer(underlying, self.address, caller, paid)?;
        debug!(market = %self.address, %underlying, %wrapped_amount, %paid, "withdraw");
        Ok(paid)
    }

    fn list(&mut self, underlying: Address, wrapped: Address, rate: U256) -> Result<()> {
        if self.reserves.contains_key(&underlying) {
            return Err(AdapterError::InvalidConfiguration("reserve already listed"));
        }
        self.reserves.insert(underlying, Reserve { wrapped, rate });
        Ok(())
    }
}

/// Lists `underlying` on `market`, creating its wrapper token `symbol` with
/// the same decimals and an initial exchange rate of `rate`.
///
/// # Errors
///
/// - [`AdapterError::UnknownToken`] if `underlying` is unregistered.
/// - [`AdapterError::InvalidConfiguration`] for a zero rate or a reserve
///   that is already listed.
pub fn list_reserve(
    chain: &mut Chain,
    market: Address,
    underlying: Address,
    symbol: &str,
    rate: U256,
) -> Result<Token> {
    if rate.is_zero() {
        return Err(AdapterError::InvalidConfiguration("exchange rate must be non-zero"));
    }
    let decimals = chain.ledger().token(underlying)?.decimals();
    chain.atomic(|chain| {
        let wrapped = chain.create_token(symbol, decimals.get())?;
        chain.call_mut::<LendingMarket, _, _>(market, |m, _| {
            m.list(underlying, wrapped.address(), rate)
        })?;
        Ok(wrapped)
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn setup(rate: u128) -> (Chain, Address, Token, Token) {
        let mut chain = Chain::new();
        let Ok(usdc) = chain.create_token("USDC", 6) else {
            panic!("token");
        };
        let Ok(market) = LendingMarket::deploy(&mut chain) else {
            panic!("market");
        };
        let Ok(ausdc) = list_reserve(&mut chain, market, usdc.address(), "aUSDC", U256::from(rate))
        else {
            panic!("list");
        };
        (chain, market, usdc, ausdc)
    }

    #[test]
    fn wrapper_mirrors_decimals_and_lookups() {
        let (chain, market, usdc, ausdc) = setup(PRECISION);
        assert_eq!(ausdc.decimals(), usdc.decimals());
        let Ok(m) = chain.contract::<LendingMarket>(market) else {
            panic!("market");
        };
        assert_eq!(m.wrapped_of(usdc.address()), Some(ausdc.address()));
        assert_eq!(m.underlying_of(ausdc.address()), Some(usdc.address()));
        assert_eq!(m.underlying_of(usdc.address()), None);
    }

    #[test]
    fn deposit_then_withdraw_rounds_down() {
        // 1.05 underlying per wrapped
        let (mut chain, market, usdc, ausdc) = setup(PRECISION / 100 * 105);
        let user = chain.create_account();
        let Ok(()) = chain.ledger_mut().mint(usdc.address(), user, Amount::new(1_000_000)) else {
            panic!("mint");
        };
        let Ok(minted) = chain.call_mut::<LendingMarket, _, _>(market, |m, l| {
            m.deposit(l, user, usdc.address(), Amount::new(1_000_000))
        }) else {
            panic!("deposit");
        };
        assert_eq!(minted, Amount::new(952_380));
        assert_eq!(chain.ledger().inspect_balance(ausdc.address(), user), minted);

        let Ok(paid) = chain.call_mut::<LendingMarket, _, _>(market, |m, l| {
            m.withdraw(l, user, usdc.address(), minted)
        }) else {
            panic!("withdraw");
        };
        assert_eq!(paid, Amount::new(999_999));
        assert_eq!(chain.ledger().inspect_balance(ausdc.address(), user), Amount::ZERO);
    }

    #[test]
    fn rate_cannot_fall() {
        let (mut chain, market, usdc, _) = setup(PRECISION);
        let result = chain.call_mut::<LendingMarket, _, _>(market, |m, _| {
            m.set_rate(usdc.address(), U256::from(PRECISION - 1))
        });
        assert_eq!(
            result,
            Err(AdapterError::InvalidConfiguration("exchange rate cannot fall"))
        );
    }
}
