//! Basis-point representation for fees and haircuts.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::{AdapterError, Result};

/// Denominator that represents 100%.
const MAX_BPS: u32 = 10_000;

/// A percentage expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// # Examples
///
/// ```
/// use hydra_adapters::domain::{Amount, BasisPoints, Rounding};
///
/// let haircut = BasisPoints::new(4);
/// let kept = haircut.retain(Amount::new(1_000_000), Rounding::Down).expect("fits");
/// assert_eq!(kept, Amount::new(999_600));
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(MAX_BPS);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is in the valid percentage range (`0..=10_000`).
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// Computes `amount * self / 10_000` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] if the intermediate product overflows.
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> Result<Amount> {
        let product = match amount.get().checked_mul(self.0 as u128) {
            Some(v) => v,
            None => return Err(AdapterError::Overflow("basis points apply overflow")),
        };
        let divisor = MAX_BPS as u128;
        let q = product / divisor;
        match rounding {
            Rounding::Down => Ok(Amount::new(q)),
            Rounding::Up if product % divisor != 0 => Ok(Amount::new(q + 1)),
            Rounding::Up => Ok(Amount::new(q)),
        }
    }

    /// Computes `amount * (10_000 - self) / 10_000`: the part of `amount`
    /// left after taking this percentage off.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] if `self` exceeds
    /// 100%, or [`AdapterError::Overflow`] if the product overflows.
    pub fn retain(&self, amount: Amount, rounding: Rounding) -> Result<Amount> {
        if !self.is_valid_percent() {
            return Err(AdapterError::InvalidConfiguration(
                "basis points exceed 100%",
            ));
        }
        Self(MAX_BPS - self.0).apply(amount, rounding)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
