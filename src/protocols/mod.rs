//! Simulated destination protocols.
//!
//! Each module models one family of on-chain liquidity with the calling
//! convention its adapters must translate: index types, pricing views,
//! settlement rounding and custody flow.
//!
//! | Feature | Module | Contract |
//! |---------|--------|----------|
//! | `constant-product` | [`unilike`] | Uniswap V2 style factory and pair |
//! | `stableswap` | [`saddle`] | StableSwap, `uint8` indices, exact settlement |
//! | `stableswap` | [`curve`] | StableSwap, `int128` indices, one-unit settlement buffer |
//! | `stableswap` | [`crypto`] | dynamic-fee pool, `uint256` indices |
//! | `stableswap` | [`lending`] | lending market minting interest-bearing wrappers |
//! | `vault` | [`vault`] | GMX style oracle-priced vault |

#[cfg(feature = "stableswap")]
use alloy_primitives::Address;

#[cfg(feature = "stableswap")]
use crate::error::Result;

#[cfg(feature = "stableswap")]
pub mod crypto;
#[cfg(feature = "stableswap")]
pub mod curve;
#[cfg(feature = "stableswap")]
pub mod lending;
#[cfg(feature = "stableswap")]
pub mod saddle;
#[cfg(feature = "stableswap")]
pub mod stableswap;
#[cfg(feature = "constant-product")]
pub mod unilike;
#[cfg(feature = "vault")]
pub mod vault;

/// A pool whose coins are enumerated by position.
///
/// `coin_at` goes through the pool's native index type, so an index the
/// native ABI cannot represent fails the same way a missing coin does.
#[cfg(feature = "stableswap")]
pub trait CoinList {
    /// Returns the coin at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`](crate::error::AdapterError::TokenIndexOutOfRange)
    /// past the last coin.
    fn coin_at(&self, index: usize) -> Result<Address>;
}
