//! Deployment-time checks.
//!
//! Neither check runs on the swap path.  [`check_token_count`] guards the
//! coin count an indexed-pool adapter is built with, and [`GasProfile`]
//! bounds the gas estimate every adapter reports.

mod gas_profile;
#[cfg(feature = "stableswap")]
mod token_count;

pub use gas_profile::{GasProfile, GasSample, MAX_MARGIN_BPS};
#[cfg(feature = "stableswap")]
pub use token_count::{
    check_token_count, deploy_crypto_adapter, deploy_curve_adapter, deploy_curve_lending_adapter,
    deploy_saddle_adapter,
};
