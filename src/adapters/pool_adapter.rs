//! Generic adapter over any [`Venue`].

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::domain::{Amount, Gas};
use crate::error::{AdapterError, Result};
use crate::host::{schedule, Chain};
use crate::math::CheckedArithmetic;
use crate::traits::{Adapter, Venue};

/// An [`Adapter`] bound to one destination through venue `V`.
///
/// `PoolAdapter` owns the protocol-independent half of every adapter:
/// unsupported-pair handling, the custody precondition, atomic execution
/// and minimum-output enforcement.  Output is measured as the recipient's
/// balance delta, so the returned amount is exactly what arrived.
#[derive(Debug, Clone)]
pub struct PoolAdapter<V> {
    name: String,
    address: Address,
    gas_estimate: Gas,
    venue: V,
}

impl<V: Venue> PoolAdapter<V> {
    /// Binds `venue` to a fresh custody account on `chain`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] for an empty name or
    /// a zero gas estimate.
    pub fn new(chain: &mut Chain, name: impl Into<String>, venue: V, gas_estimate: Gas) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AdapterError::InvalidConfiguration("adapter name must not be empty"));
        }
        if gas_estimate == Gas::ZERO {
            return Err(AdapterError::InvalidConfiguration("gas estimate must be non-zero"));
        }
        let address = chain.create_account();
        debug!(adapter = %name, %address, pool = %venue.pool(), protocol = V::PROTOCOL, "adapter bound");
        Ok(Self {
            name,
            address,
            gas_estimate,
            venue,
        })
    }

    /// The underlying venue.
    #[must_use]
    pub const fn venue(&self) -> &V {
        &self.venue
    }

    fn execute(
        &self,
        chain: &mut Chain,
        amount_in: Amount,
        min_out: Amount,
        (from, to): (Address, Address),
        recipient: Address,
    ) -> Result<Amount> {
        chain.ledger().charge(schedule::CALL);
        let unsupported = AdapterError::UnsupportedPair { from, to };
        if from == to {
            return Err(unsupported);
        }
        let route = self.venue.resolve(chain, from, to).ok_or(unsupported)?;
        if amount_in.is_zero() {
            return Err(AdapterError::InvalidAmount("cannot swap zero"));
        }
        let held = chain.ledger().balance_of(from, self.address)?;
        if held < amount_in {
            return Err(AdapterError::InsufficientBalance {
                token: from,
                account: self.address,
                needed: amount_in,
                available: held,
            });
        }

        let before = chain.ledger().balance_of(to, recipient)?;
        self.venue
            .execute(chain, self.address, route, amount_in, recipient)?;
        let after = chain.ledger().balance_of(to, recipient)?;
        let amount_out = after.safe_sub(&before)?;
        if amount_out < min_out {
            return Err(AdapterError::InsufficientOutput {
                amount_out,
                min_out,
            });
        }
        Ok(amount_out)
    }
}

impl<V: Venue> Adapter for PoolAdapter<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Address {
        self.address
    }

    fn pool(&self) -> Address {
        self.venue.pool()
    }

    fn swap_gas_estimate(&self) -> Gas {
        self.gas_estimate
    }

    fn is_pool_token(&self, chain: &Chain, token: Address) -> bool {
        self.venue.is_pool_token(chain, token)
    }

    fn query(&self, chain: &Chain, amount_in: Amount, from: Address, to: Address) -> Result<Amount> {
        if amount_in.is_zero() || from == to {
            return Ok(Amount::ZERO);
        }
        chain.ledger().charge(schedule::CALL);
        let Some(route) = self.venue.resolve(chain, from, to) else {
            return Ok(Amount::ZERO);
        };
        let amount_out = self.venue.quote(chain, route, amount_in)?;
        debug!(
            adapter = %self.name,
            %from,
            %to,
            %amount_in,
            %amount_out,
            correction = %V::CORRECTION,
            "query"
        );
        Ok(amount_out)
    }

    fn swap(
        &self,
        chain: &mut Chain,
        amount_in: Amount,
        min_out: Amount,
        from: Address,
        to: Address,
        recipient: Address,
    ) -> Result<Amount> {
        let result = chain.atomic(|chain| self.execute(chain, amount_in, min_out, (from, to), recipient));
        match &result {
            Ok(amount_out) => debug!(
                adapter = %self.name,
                %from,
                %to,
                %amount_in,
                %amount_out,
                %recipient,
                "swap"
            ),
            Err(err) => warn!(
                adapter = %self.name,
                %from,
                %to,
                %amount_in,
                %min_out,
                error = %err,
                "swap reverted"
            ),
        }
        result
    }
}
