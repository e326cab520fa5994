//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hydra_adapters::prelude::*;
//! ```

pub use crate::domain::{Amount, BasisPoints, Decimals, Gas, QuoteCorrection, Rounding, Token};

pub use crate::traits::{Adapter, Venue};

pub use crate::adapters::{AdapterBox, PoolAdapter, TokenResolver};

#[cfg(feature = "constant-product")]
pub use crate::adapters::{UnilikeAdapter, UnilikeVenue};

#[cfg(feature = "stableswap")]
pub use crate::adapters::{
    CryptoAdapter, CryptoVenue, CurveAdapter, CurveLendingAdapter, CurveLendingVenue,
    CurvePlainVenue, SaddleAdapter, SaddleVenue,
};

#[cfg(feature = "vault")]
pub use crate::adapters::{GmxAdapter, GmxVenue};

pub use crate::config::{ConfigError, DeployOptions, NetworkOptions};

pub use crate::deployment::{GasProfile, GasSample};

pub use crate::host::{Chain, Ledger};

pub use crate::error::{AdapterError, Result};
