//! Uniform quote-and-swap interface over one destination protocol.
//!
//! Every adapter answers four questions:
//!
//! 1. **Support** — [`Adapter::is_pool_token`]: can the destination trade
//!    this token at all?
//! 2. **Quote** — [`Adapter::query`]: what would `amount_in` of `from`
//!    yield in `to` right now?
//! 3. **Execute** — [`Adapter::swap`]: perform that trade with input the
//!    adapter already holds.
//! 4. **Cost** — [`Adapter::swap_gas_estimate`]: upper bound on the gas
//!    of one quote plus one swap.
//!
//! # Parity Invariant
//!
//! For every supported pair and every amount within the destination's
//! liquidity, under unchanged pool state:
//!
//! ```text
//! q = query(amount_in, from, to)
//! swap(amount_in, q, from, to, recipient) == q     // never reverts
//! ```
//!
//! and the adapter holds no `to` afterwards.  Quotes are therefore
//! corrected downward wherever the destination's own view overstates
//! settlement.
//!
//! # Custody
//!
//! The adapter does not pull funds.  A caller transfers `amount_in` of
//! `from` to [`Adapter::address`] and then calls [`Adapter::swap`] in the
//! same transaction.

use alloy_primitives::Address;

use crate::domain::{Amount, Gas};
use crate::error::Result;
use crate::host::Chain;

/// A quote-and-swap adapter permanently bound to one destination.
///
/// Adapters are immutable after construction: every call re-reads pool
/// state from the [`Chain`] and nothing is cached between calls except the
/// pool's immutable token layout.
pub trait Adapter {
    /// Human-readable adapter name, unique within a registry.
    fn name(&self) -> &str;

    /// Account that holds input between transfer-in and swap.
    fn address(&self) -> Address;

    /// Destination contract this adapter routes to.
    fn pool(&self) -> Address;

    /// Worst-case gas of one [`query`](Self::query) plus one
    /// [`swap`](Self::swap), fixed at construction.
    fn swap_gas_estimate(&self) -> Gas;

    /// Returns `true` if the destination can trade `token`.
    fn is_pool_token(&self, chain: &Chain, token: Address) -> bool;

    /// Expected output of swapping `amount_in` of `from` into `to`.
    ///
    /// Returns zero, not an error, when the pair is unsupported, when
    /// `from == to`, or when `amount_in` is zero.  Never mutates state.
    ///
    /// # Errors
    ///
    /// Propagates destination failures such as arithmetic overflow or a
    /// paused pool.
    fn query(&self, chain: &Chain, amount_in: Amount, from: Address, to: Address) -> Result<Amount>;

    /// Swaps `amount_in` of `from`, already held by the adapter, into `to`
    /// and delivers the whole output to `recipient`.
    ///
    /// Atomic: on any error no balance or pool state changes.
    ///
    /// # Errors
    ///
    /// - [`UnsupportedPair`](crate::error::AdapterError::UnsupportedPair)
    ///   if the destination cannot route `from` into `to`.
    /// - [`InsufficientBalance`](crate::error::AdapterError::InsufficientBalance)
    ///   if the adapter holds less than `amount_in`.
    /// - [`InsufficientOutput`](crate::error::AdapterError::InsufficientOutput)
    ///   if fewer than `min_out` units arrive.
    /// - Any destination failure, unchanged.
    fn swap(
        &self,
        chain: &mut Chain,
        amount_in: Amount,
        min_out: Amount,
        from: Address,
        to: Address,
        recipient: Address,
    ) -> Result<Amount>;
}
