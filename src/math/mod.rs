//! Arithmetic utilities for pool pricing.
//!
//! [`CheckedArithmetic`] for overflow-safe domain arithmetic, 256-bit
//! checked helpers, and the n-coin StableSwap Newton-Raphson solvers.

mod checked;
pub mod stableswap;

pub use checked::{add, div, mul, mul_div, sub, to_amount, CheckedArithmetic};
