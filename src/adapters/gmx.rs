//! Vault venue: oracle-priced swaps between any two whitelisted tokens.

use alloy_primitives::Address;

use super::PoolAdapter;
use crate::domain::{Amount, QuoteCorrection};
use crate::error::{AdapterError, Result};
use crate::host::Chain;
use crate::protocols::vault::Vault;
use crate::traits::Venue;

/// Adapter over a GMX-style vault.
pub type GmxAdapter = PoolAdapter<GmxVenue>;

/// Routes directly through the vault.
///
/// Quotes collapse to zero when the vault could not settle the trade:
/// output pool short of liquidity, input debt cap reached, or swaps
/// disabled.  Settlement then reverts with the vault's own error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GmxVenue {
    vault: Address,
}

impl GmxVenue {
    /// Binds to `vault`.
    ///
    /// # Errors
    ///
    /// Lookup errors if `vault` is not a vault.
    pub fn new(chain: &Chain, vault: Address) -> Result<Self> {
        chain.contract::<Vault>(vault)?;
        Ok(Self { vault })
    }
}

impl Venue for GmxVenue {
    type Route = (Address, Address);

    const PROTOCOL: &'static str = "vault";
    const CORRECTION: QuoteCorrection = QuoteCorrection::None;

    fn pool(&self) -> Address {
        self.vault
    }

    fn is_pool_token(&self, chain: &Chain, token: Address) -> bool {
        chain
            .call::<Vault, _, _>(self.vault, |v, _| Ok(v.is_whitelisted(token)))
            .unwrap_or(false)
    }

    fn resolve(&self, chain: &Chain, from: Address, to: Address) -> Option<(Address, Address)> {
        let listed = chain
            .call::<Vault, _, _>(self.vault, |v, _| Ok(v.is_whitelisted(from) && v.is_whitelisted(to)))
            .ok()?;
        listed.then_some((from, to))
    }

    fn quote(&self, chain: &Chain, (from, to): (Address, Address), amount_in: Amount) -> Result<Amount> {
        match chain.call::<Vault, _, _>(self.vault, |v, ledger| v.get_amount_out(ledger, from, to, amount_in)) {
            Ok(out) => Self::CORRECTION.apply(out),
            Err(
                AdapterError::InsufficientLiquidity
                | AdapterError::MaxUsdgExceeded(_)
                | AdapterError::SwapsDisabled(_),
            ) => Ok(Amount::ZERO),
            Err(err) => Err(err),
        }
    }

    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        (from, to): (Address, Address),
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()> {
        chain
            .ledger_mut()
            .transfer(from, custody, self.vault, amount_in)?;
        chain
            .call_mut::<Vault, _, _>(self.vault, |v, ledger| v.swap(ledger, from, to, recipient))
            .map(|_| ())
    }
}
