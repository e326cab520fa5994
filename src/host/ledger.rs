//! Token registry, balances and gas accounting of the host chain.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::Address;
use tracing::trace;

use super::gas::{schedule, GasMeter};
use crate::domain::{Amount, Decimals, Gas, Token};
use crate::error::{AdapterError, Result};
use crate::math::CheckedArithmetic;

/// Registry entry for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// Ticker symbol.
    pub symbol: String,
    /// Address and precision.
    pub token: Token,
}

/// Everything a reverted transaction must restore.
#[derive(Debug, Clone, Default)]
pub(crate) struct LedgerState {
    tokens: BTreeMap<Address, TokenInfo>,
    balances: HashMap<(Address, Address), Amount>,
    supply: HashMap<Address, Amount>,
}

/// Balances of every registered token, plus the gas meter and block clock.
///
/// Metered operations ([`balance_of`](Self::balance_of),
/// [`transfer`](Self::transfer), [`mint`](Self::mint),
/// [`burn`](Self::burn)) model ERC-20 calls.  Methods prefixed
/// `inspect_` or `set_` are harness helpers and charge nothing.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: LedgerState,
    gas: GasMeter,
    timestamp: u64,
}

impl Ledger {
    /// Creates an empty ledger at timestamp zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Registry -------------------------------------------------------------

    pub(crate) fn register_token(
        &mut self,
        address: Address,
        symbol: &str,
        decimals: Decimals,
    ) -> Result<Token> {
        if self.state.tokens.contains_key(&address) {
            return Err(AdapterError::InvalidConfiguration(
                "token already registered",
            ));
        }
        let token = Token::new(address, decimals);
        self.state.tokens.insert(
            address,
            TokenInfo {
                symbol: symbol.to_string(),
                token,
            },
        );
        Ok(token)
    }

    /// Looks up a registered token.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] for an unregistered address.
    pub fn token(&self, address: Address) -> Result<Token> {
        self.info(address).map(|info| info.token)
    }

    /// Looks up the registry entry of a token.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] for an unregistered address.
    pub fn info(&self, address: Address) -> Result<&TokenInfo> {
        self.state
            .tokens
            .get(&address)
            .ok_or(AdapterError::UnknownToken(address))
    }

    /// Returns `true` if `address` is a registered token.
    #[must_use]
    pub fn is_token(&self, address: Address) -> bool {
        self.state.tokens.contains_key(&address)
    }

    // -- Metered token operations ---------------------------------------------

    /// Returns the balance of `owner`, charging one storage read.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] for an unregistered token.
    pub fn balance_of(&self, token: Address, owner: Address) -> Result<Amount> {
        self.gas.charge(schedule::SLOAD);
        self.ensure_token(token)?;
        Ok(self.inspect_balance(token, owner))
    }

    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::UnknownToken`] for an unregistered token.
    /// - [`AdapterError::InsufficientBalance`] if `from` holds less than
    ///   `amount`.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.gas.charge(schedule::SLOAD.times(2) + schedule::SSTORE.times(2));
        self.ensure_token(token)?;
        let available = self.inspect_balance(token, from);
        let remaining =
            available
                .checked_sub(&amount)
                .ok_or(AdapterError::InsufficientBalance {
                    token,
                    account: from,
                    needed: amount,
                    available,
                })?;
        self.write_balance(token, from, remaining);
        let credited = self.inspect_balance(token, to).safe_add(&amount)?;
        self.write_balance(token, to, credited);
        trace!(%token, %from, %to, %amount, "transfer");
        Ok(())
    }

    /// Creates `amount` of `token` in `to`'s balance.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] or
    /// [`AdapterError::Overflow`] if supply would exceed `u128::MAX`.
    pub fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<()> {
        self.gas.charge(schedule::SUPPLY_UPDATE + schedule::SSTORE);
        self.ensure_token(token)?;
        let supply = self.total_supply(token).safe_add(&amount)?;
        let credited = self.inspect_balance(token, to).safe_add(&amount)?;
        self.state.supply.insert(token, supply);
        self.write_balance(token, to, credited);
        trace!(%token, %to, %amount, "mint");
        Ok(())
    }

    /// Destroys `amount` of `token` from `from`'s balance.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InsufficientBalance`] if `from` holds less
    /// than `amount`.
    pub fn burn(&mut self, token: Address, from: Address, amount: Amount) -> Result<()> {
        self.gas.charge(schedule::SUPPLY_UPDATE + schedule::SSTORE);
        self.ensure_token(token)?;
        let available = self.inspect_balance(token, from);
        let remaining =
            available
                .checked_sub(&amount)
                .ok_or(AdapterError::InsufficientBalance {
                    token,
                    account: from,
                    needed: amount,
                    available,
                })?;
        let supply = self.total_supply(token).safe_sub(&amount)?;
        self.state.supply.insert(token, supply);
        self.write_balance(token, from, remaining);
        trace!(%token, %from, %amount, "burn");
        Ok(())
    }

    // -- Unmetered helpers ----------------------------------------------------

    /// Returns a balance without charging gas.
    #[must_use]
    pub fn inspect_balance(&self, token: Address, owner: Address) -> Amount {
        self.state
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Total minted supply of `token`.
    #[must_use]
    pub fn total_supply(&self, token: Address) -> Amount {
        self.state
            .supply
            .get(&token)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Overwrites a balance, adjusting supply to match.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownToken`] or an arithmetic error if the
    /// adjusted supply does not fit.
    pub fn set_balance(&mut self, token: Address, owner: Address, amount: Amount) -> Result<()> {
        self.ensure_token(token)?;
        let previous = self.inspect_balance(token, owner);
        let supply = self
            .total_supply(token)
            .safe_sub(&previous)?
            .safe_add(&amount)?;
        self.state.supply.insert(token, supply);
        self.write_balance(token, owner, amount);
        Ok(())
    }

    // -- Gas and clock --------------------------------------------------------

    /// Charges `gas` to the meter.
    pub fn charge(&self, gas: Gas) {
        self.gas.charge(gas);
    }

    /// Total gas consumed since the ledger was created.
    #[must_use]
    pub fn gas_used(&self) -> Gas {
        self.gas.used()
    }

    /// Current block timestamp in seconds.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Moves the block clock forward.
    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    // -- Internals ------------------------------------------------------------

    pub(crate) fn snapshot(&self) -> LedgerState {
        self.state.clone()
    }

    pub(crate) fn restore(&mut self, state: LedgerState) {
        self.state = state;
    }

    fn ensure_token(&self, token: Address) -> Result<()> {
        if self.is_token(token) {
            Ok(())
        } else {
            Err(AdapterError::UnknownToken(token))
        }
    }

    fn write_balance(&mut self, token: Address, owner: Address, amount: Amount) {
        if amount.is_zero() {
            self.state.balances.remove(&(token, owner));
        } else {
            self.state.balances.insert((token, owner), amount);
        }
    }
}
