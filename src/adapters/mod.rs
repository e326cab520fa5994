//! Protocol adapters.
//!
//! Each family implements [`Venue`](crate::traits::Venue) and is lifted
//! into a full [`Adapter`](crate::traits::Adapter) by [`PoolAdapter`]:
//!
//! | Adapter | Venue | Indices | Quote correction |
//! |---------|-------|---------|------------------|
//! | [`UnilikeAdapter`] | [`UnilikeVenue`] | pair lookup | exact |
//! | [`SaddleAdapter`] | [`SaddleVenue`] | `uint8` | exact |
//! | [`CurveAdapter`] | [`CurvePlainVenue`] | `int128` | −1 unit |
//! | [`CurveLendingAdapter`] | [`CurveLendingVenue`] | `int128`, underlying | −1 unit |
//! | [`CryptoAdapter`] | [`CryptoVenue`] | `uint256` | −4 bp |
//! | [`GmxAdapter`] | [`GmxVenue`] | token address | exact |
//!
//! [`AdapterBox`] wraps all of them for heterogeneous collections.

mod adapter_box;
mod pool_adapter;
mod resolver;

#[cfg(feature = "stableswap")]
mod crypto;
#[cfg(feature = "stableswap")]
mod curve;
#[cfg(feature = "vault")]
mod gmx;
#[cfg(feature = "stableswap")]
mod saddle;
#[cfg(feature = "constant-product")]
mod unilike;

#[cfg(all(test, feature = "constant-product", feature = "stableswap"))]
#[allow(clippy::panic)]
mod proptest_properties;

pub use adapter_box::AdapterBox;
pub use pool_adapter::PoolAdapter;
pub use resolver::TokenResolver;

#[cfg(feature = "stableswap")]
pub use crypto::{CryptoAdapter, CryptoVenue, CRYPTO_HAIRCUT};
#[cfg(feature = "stableswap")]
pub use curve::{CurveAdapter, CurveLendingAdapter, CurveLendingVenue, CurvePlainVenue, WrappedRoute};
#[cfg(feature = "vault")]
pub use gmx::{GmxAdapter, GmxVenue};
#[cfg(feature = "stableswap")]
pub use saddle::{SaddleAdapter, SaddleVenue};
#[cfg(feature = "constant-product")]
pub use unilike::{PairRoute, UnilikeAdapter, UnilikeVenue};
