//! Checked arithmetic with typed errors.
//!
//! [`CheckedArithmetic`] lifts the `Option`-returning checked operations on
//! [`Amount`] into [`Result`]s carrying the matching [`AdapterError`]
//! variant.  The free functions below do the same for the 256-bit
//! intermediates used by pool math.
//!
//! # Examples
//!
//! ```
//! use hydra_adapters::domain::Amount;
//! use hydra_adapters::math::CheckedArithmetic;
//!
//! let sum = Amount::new(100).safe_add(&Amount::new(200));
//! assert_eq!(sum, Ok(Amount::new(300)));
//! assert!(Amount::ZERO.safe_sub(&Amount::new(1)).is_err());
//! ```

use alloy_primitives::U256;

use crate::domain::{Amount, Rounding};
use crate::error::{AdapterError, Result};

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics**: every error condition produces `Err`.
/// - **No saturation**: errors propagate instead.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] on overflow.
    fn safe_add(&self, other: &Self) -> Result<Self>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] on overflow.
    fn safe_mul(&self, other: &Self) -> Result<Self>;

    /// Checked division with explicit [`Rounding`] direction.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self> {
        self.checked_add(other)
            .ok_or(AdapterError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self> {
        self.checked_sub(other)
            .ok_or(AdapterError::Underflow("amount subtraction underflow"))
    }

    #[inline]
    fn safe_mul(&self, other: &Self) -> Result<Self> {
        self.checked_mul(other)
            .ok_or(AdapterError::Overflow("amount multiplication overflow"))
    }

    #[inline]
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self> {
        self.checked_div(other, rounding)
            .ok_or(AdapterError::DivisionByZero)
    }
}

// ---------------------------------------------------------------------------
// 256-bit helpers
// ---------------------------------------------------------------------------

/// `a + b`, failing with `Overflow(ctx)`.
#[inline]
pub fn add(a: U256, b: U256, ctx: &'static str) -> Result<U256> {
    a.checked_add(b).ok_or(AdapterError::Overflow(ctx))
}

/// `a - b`, failing with `Underflow(ctx)`.
#[inline]
pub fn sub(a: U256, b: U256, ctx: &'static str) -> Result<U256> {
    a.checked_sub(b).ok_or(AdapterError::Underflow(ctx))
}

/// `a * b`, failing with `Overflow(ctx)`.
#[inline]
pub fn mul(a: U256, b: U256, ctx: &'static str) -> Result<U256> {
    a.checked_mul(b).ok_or(AdapterError::Overflow(ctx))
}

/// Floor division, failing with `DivisionByZero`.
#[inline]
pub fn div(a: U256, b: U256) -> Result<U256> {
    a.checked_div(b).ok_or(AdapterError::DivisionByZero)
}

/// `a * b / d` rounded down.
///
/// # Errors
///
/// Returns `Overflow(ctx)` if `a * b` exceeds 256 bits, or
/// `DivisionByZero` if `d` is zero.
#[inline]
pub fn mul_div(a: U256, b: U256, d: U256, ctx: &'static str) -> Result<U256> {
    div(mul(a, b, ctx)?, d)
}

/// Narrows a 256-bit value back to an [`Amount`].
///
/// # Errors
///
/// Returns `Overflow(ctx)` if the value exceeds `u128::MAX`.
pub fn to_amount(value: U256, ctx: &'static str) -> Result<Amount> {
    if value > U256::from(u128::MAX) {
        return Err(AdapterError::Overflow(ctx));
    }
    let limbs = value.as_limbs();
    Ok(Amount::new((u128::from(limbs[1]) << 64) | u128::from(limbs[0])))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn amount_ops() {
        assert_eq!(Amount::new(6).safe_mul(&Amount::new(7)), Ok(Amount::new(42)));
        assert_eq!(
            Amount::new(7).safe_div(&Amount::new(2), Rounding::Up),
            Ok(Amount::new(4))
        );
        let Err(AdapterError::Underflow(_)) = Amount::new(1).safe_sub(&Amount::new(2)) else {
            panic!("expected Underflow");
        };
        let Err(AdapterError::DivisionByZero) =
            Amount::new(1).safe_div(&Amount::ZERO, Rounding::Down)
        else {
            panic!("expected DivisionByZero");
        };
    }

    #[test]
    fn wide_mul_div_beyond_u128() {
        let big = U256::from(u128::MAX);
        let Ok(r) = mul_div(big, big, big, "test") else {
            panic!("expected Ok");
        };
        assert_eq!(r, big);
    }

    #[test]
    fn narrowing() {
        assert_eq!(to_amount(U256::from(u128::MAX), "n"), Ok(Amount::MAX));
        assert_eq!(
            to_amount(U256::from(u128::MAX) + U256::from(1u8), "narrow"),
            Err(AdapterError::Overflow("narrow"))
        );
        assert_eq!(to_amount(U256::from(12_345u64), "n"), Ok(Amount::new(12_345)));
    }

    #[test]
    fn wide_sub_underflow() {
        assert_eq!(
            sub(U256::ZERO, U256::from(1u8), "s"),
            Err(AdapterError::Underflow("s"))
        );
    }
}
