//! Protocol-family seam beneath [`Adapter`](super::Adapter).

use core::fmt;

use alloy_primitives::Address;

use crate::domain::{Amount, QuoteCorrection};
use crate::error::Result;
use crate::host::Chain;

/// Translation between the adapter surface and one destination ABI.
///
/// A venue knows how to turn a token pair into the protocol's own route
/// (pair address, `uint8`/`int128`/`uint256` indices, wrapped coins) and
/// how to price and settle along that route.  Validation, custody checks,
/// atomicity and slippage enforcement live in
/// [`PoolAdapter`](crate::adapters::PoolAdapter), not here.
pub trait Venue {
    /// Protocol-specific route for one `from → to` direction.
    type Route: Copy + fmt::Debug;

    /// Family name, used in logs.
    const PROTOCOL: &'static str;

    /// Downward correction applied to the destination's pricing view.
    const CORRECTION: QuoteCorrection;

    /// Destination contract.
    fn pool(&self) -> Address;

    /// Returns `true` if `token` is tradeable on the destination.
    fn is_pool_token(&self, chain: &Chain, token: Address) -> bool;

    /// Resolves `from → to`, or `None` if either side is unsupported.
    ///
    /// Callers have already excluded `from == to`.
    fn resolve(&self, chain: &Chain, from: Address, to: Address) -> Option<Self::Route>;

    /// Corrected output of `amount_in` along `route`.
    ///
    /// # Errors
    ///
    /// Propagates destination pricing failures.
    fn quote(&self, chain: &Chain, route: Self::Route, amount_in: Amount) -> Result<Amount>;

    /// Settles `amount_in` held by `custody` along `route`, leaving the
    /// output with `recipient` and nothing with `custody`.
    ///
    /// # Errors
    ///
    /// Propagates destination execution failures.
    fn execute(
        &self,
        chain: &mut Chain,
        custody: Address,
        route: Self::Route,
        amount_in: Amount,
        recipient: Address,
    ) -> Result<()>;
}
