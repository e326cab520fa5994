//! Single-threaded host chain: ledger, contract table and transactions.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use tracing::trace;

use super::contract::{Contract, ContractKind};
use super::gas::schedule;
use super::ledger::Ledger;
use crate::domain::{Decimals, Gas, Token};
use crate::error::{AdapterError, Result};

/// The global state every adapter and destination protocol reads and
/// writes.
///
/// Calls run to completion one at a time.  [`atomic`](Self::atomic) gives
/// transaction semantics: on error every balance and every contract is
/// restored, while gas already consumed stays consumed.  Each
/// [`call_mut`](Self::call_mut) is itself atomic, mirroring a reverting
/// external call.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    ledger: Ledger,
    contracts: BTreeMap<Address, Contract>,
    nonce: u64,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to balances, gas and the clock.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Write access to balances, gas and the clock.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    // -- Accounts and tokens --------------------------------------------------

    /// Allocates a fresh externally-owned account.
    pub fn create_account(&mut self) -> Address {
        self.next_address()
    }

    /// Registers a new token at a fresh address.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidPrecision`] if `decimals` exceeds 18.
    pub fn create_token(&mut self, symbol: &str, decimals: u8) -> Result<Token> {
        let decimals = Decimals::new(decimals)?;
        let address = self.next_address();
        self.ledger.register_token(address, symbol, decimals)
    }

    // -- Contracts ------------------------------------------------------------

    /// Deploys a contract built by `build` at a fresh address.
    ///
    /// # Errors
    ///
    /// Propagates any error from `build`; nothing is deployed in that case.
    pub fn deploy<C, F>(&mut self, build: F) -> Result<Address>
    where
        C: ContractKind,
        F: FnOnce(Address, &mut Ledger) -> Result<C>,
    {
        let address = self.next_address();
        let contract = build(address, &mut self.ledger)?;
        trace!(%address, kind = C::KIND, "deploy");
        self.contracts.insert(address, contract.wrap());
        Ok(address)
    }

    /// Returns `true` if any contract lives at `address`.
    #[must_use]
    pub fn is_contract(&self, address: Address) -> bool {
        self.contracts.contains_key(&address)
    }

    /// Borrows the raw contract entry at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownContract`] if nothing is deployed there.
    pub fn contract_at(&self, address: Address) -> Result<&Contract> {
        self.contracts
            .get(&address)
            .ok_or(AdapterError::UnknownContract(address))
    }

    /// Borrows the contract at `address` as a `C`, without charging gas.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::UnknownContract`] if nothing is deployed there.
    /// - [`AdapterError::WrongContractKind`] if it is not a `C`.
    pub fn contract<C: ContractKind>(&self, address: Address) -> Result<&C> {
        C::downcast(self.contract_at(address)?).ok_or(AdapterError::WrongContractKind {
            address,
            expected: C::KIND,
        })
    }

    /// Calls a view function on the contract at `address`.
    ///
    /// # Errors
    ///
    /// Returns lookup errors as [`contract`](Self::contract) does, and
    /// propagates the error returned by `f`.
    pub fn call<C, T, F>(&self, address: Address, f: F) -> Result<T>
    where
        C: ContractKind,
        F: FnOnce(&C, &Ledger) -> Result<T>,
    {
        self.ledger.charge(schedule::CALL);
        let contract = self.contract::<C>(address)?;
        f(contract, &self.ledger)
    }

    /// Calls a state-changing function on the contract at `address`.
    ///
    /// The call is atomic: if `f` fails, the contract and all balances
    /// are restored.
    ///
    /// # Errors
    ///
    /// Returns lookup errors as [`contract`](Self::contract) does, and
    /// propagates the error returned by `f`.
    pub fn call_mut<C, T, F>(&mut self, address: Address, f: F) -> Result<T>
    where
        C: ContractKind,
        F: FnOnce(&mut C, &mut Ledger) -> Result<T>,
    {
        self.ledger.charge(schedule::CALL);
        self.atomic(|chain| {
            let Chain {
                ledger, contracts, ..
            } = chain;
            let entry = contracts
                .get_mut(&address)
                .ok_or(AdapterError::UnknownContract(address))?;
            let contract = C::downcast_mut(entry).ok_or(AdapterError::WrongContractKind {
                address,
                expected: C::KIND,
            })?;
            f(contract, ledger)
        })
    }

    // -- Transactions ---------------------------------------------------------

    /// Runs `f` as one all-or-nothing unit.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f` after restoring state.
    pub fn atomic<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let ledger_state = self.ledger.snapshot();
        let contracts = self.contracts.clone();
        let nonce = self.nonce;
        let result = f(self);
        if let Err(err) = &result {
            trace!(error = %err, "revert");
            self.ledger.restore(ledger_state);
            self.contracts = contracts;
            self.nonce = nonce;
        }
        result
    }

    /// Runs a read-only top-level call and reports the gas it consumed,
    /// including the intrinsic transaction cost.
    pub fn metered<T, F>(&self, f: F) -> (T, Gas)
    where
        F: FnOnce(&Self) -> T,
    {
        let before = self.ledger.gas_used();
        self.ledger.charge(schedule::TX_BASE);
        let out = f(self);
        (out, gas_since(before, self.ledger.gas_used()))
    }

    /// Runs a state-changing top-level call and reports the gas it
    /// consumed, including the intrinsic transaction cost.
    pub fn metered_mut<T, F>(&mut self, f: F) -> (T, Gas)
    where
        F: FnOnce(&mut Self) -> T,
    {
        let before = self.ledger.gas_used();
        self.ledger.charge(schedule::TX_BASE);
        let out = f(self);
        (out, gas_since(before, self.ledger.gas_used()))
    }

    fn next_address(&mut self) -> Address {
        self.nonce += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0x1c;
        bytes[12..].copy_from_slice(&self.nonce.to_be_bytes());
        Address::new(bytes)
    }
}

fn gas_since(before: Gas, after: Gas) -> Gas {
    Gas::new(after.get().saturating_sub(before.get()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Amount;

    #[test]
    fn addresses_are_unique_and_non_zero() {
        let mut chain = Chain::new();
        let a = chain.create_account();
        let b = chain.create_account();
        assert_ne!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn atomic_restores_balances_but_keeps_gas() {
        let mut chain = Chain::new();
        let Ok(usdc) = chain.create_token("USDC", 6) else {
            panic!("token");
        };
        let alice = chain.create_account();
        let bob = chain.create_account();
        let Ok(()) = chain
            .ledger_mut()
            .set_balance(usdc.address(), alice, Amount::new(100))
        else {
            panic!("seed");
        };

        let result: Result<()> = chain.atomic(|c| {
            c.ledger_mut()
                .transfer(usdc.address(), alice, bob, Amount::new(60))?;
            c.ledger_mut()
                .transfer(usdc.address(), alice, bob, Amount::new(60))
        });

        assert!(result.is_err());
        assert_eq!(
            chain.ledger().inspect_balance(usdc.address(), alice),
            Amount::new(100)
        );
        assert_eq!(chain.ledger().inspect_balance(usdc.address(), bob), Amount::ZERO);
        assert!(chain.ledger().gas_used() > Gas::ZERO);
    }

    #[test]
    fn metered_includes_transaction_base() {
        let chain = Chain::new();
        let ((), gas) = chain.metered(|_| ());
        assert_eq!(gas, schedule::TX_BASE);
    }

    #[test]
    fn unknown_contract() {
        let chain = Chain::new();
        let nowhere = Address::with_last_byte(9);
        assert_eq!(
            chain.contract_at(nowhere).map(Contract::kind),
            Err(AdapterError::UnknownContract(nowhere))
        );
    }
}
