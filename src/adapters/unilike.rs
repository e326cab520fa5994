//! Constant-product venue: one factory, any of its pairs.

use alloy_primitives::Address;

use super::PoolAdapter;
use crate::domain::{Amount, QuoteCorrection};
use crate::error::{AdapterError, Result};
use crate::host::Chain;
use crate::protocols::unilike::{get_amount_out, UnilikeFactory, UnilikePair};
use crate::traits::Venue;

/// Adapter over a constant-product factory.
pub type UnilikeAdapter = PoolAdapter<UnilikeVenue>;

/// Route through one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRoute {
    /// Pair contract.
    pub pair: Address,
    /// `true` if the input token is the pair's `token0`.
    pub zero_for_one: bool,
}

/// Routes through whichever factory pair trades the requested tokens.
///
/// Support is decided per call by the factory's pair lookup, so pairs
/// created after construction become reachable immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnilikeVenue {
    factory: Address,
    fee_per_mille: u32,
}

impl UnilikeVenue {
    /// Binds to `factory`, whose pairs charge `fee_per_mille` thousandths.
    ///
    /// # Errors
    ///
    /// - Lookup errors if `factory` is not a constant-product factory.
    /// - [`AdapterError::InvalidConfiguration`] if `fee_per_mille` differs
    ///   from the factory's fee.
    pub fn new(chain: &Chain, factory: Address, fee_per_mille: u32) -> Result<Self> {
        let actual = chain.contract::<UnilikeFactory>(factory)?.fee_per_mille();
        if actual != fee_per_mille {
            return Err(AdapterError::InvalidConfiguration(
                "fee differs from the factory's",
            ));
        }
        Ok(Self {
            factory,
            fee_per_mille,
        })
    }

    /// Fee in thousandths.
    #[must_use]
    pub const fn fee_per_mille(&self) -> u32 {
        self.fee_per_mille
    }
}

impl Venue for UnilikeVenue {
    type Route = PairRoute;

    const PROTOCOL: &'static str = "constant-product";
    const CORRECTION: QuoteCorrection = QuoteCorrection::None;

    fn pool(&self) -> Address {
        self.factory
    }

    fn is_pool_token(&self, chain: &Chain, token: Address) -> bool {
        chain
            .call::<UnilikeFactory, _, _>(self.factory, |f, _| Ok(f.lists_token(token)))
            .unwrap_or(false)
    }

    fn resolve(&self, chain: &Chain, from: Address, to: Address) -> Option<PairRoute> {
        let pair = chain
            .call::<UnilikeFactory, _, _>(self.factory, |f, _| Ok(f.get_pair(from, to)))
            .ok()??;
        Some(PairRoute {
            pair,
            zero_for_one: from < to,
        })
    }

    fn quote(&self, chain: &Chain, route: PairRoute, amount_in: Amount) -> Result<Amount> {
        let (r0, r1) = chain.call::<UnilikePair, _, _>(route.pair, |p, ledger| Ok(p.get_reserves(ledger)))?;
        let (reserve_in, reserve_out) = if route.zero_for_one { (r0, r1) } else { (r1, r0) };
        let out = get_amount_out(amount_in, reserve_in, reserve_out, self.fee_per_mille)?;
        Self::CORRECTION.apply(out)
    }

    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        route: PairRoute,
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()> {
        let amount_out = self.quote(chain, route, amount_in)?;
        let token_in = chain.call::<UnilikePair, _, _>(route.pair, |p, _| {
            Ok(if route.zero_for_one { p.token0() } else { p.token1() })
        })?;
        chain
            .ledger_mut()
            .transfer(token_in, custody, route.pair, amount_in)?;
        let (out0, out1) = if route.zero_for_one {
            (Amount::ZERO, amount_out)
        } else {
            (amount_out, Amount::ZERO)
        };
        chain.call_mut::<UnilikePair, _, _>(route.pair, |p, ledger| p.swap(ledger, out0, out1, recipient))
    }
}
