//! Token decimal places.

use crate::error::{AdapterError, Result};

/// Maximum allowed decimal places (EVM standard).
const MAX_DECIMALS: u8 = 18;

/// Number of decimal places of an ERC-20 style token.
///
/// Valid range is `0..=18`; StableSwap pools normalise every coin to
/// 18 decimals, so larger precisions cannot be priced.
///
/// # Examples
///
/// ```
/// use hydra_adapters::domain::Decimals;
///
/// let usdc = Decimals::new(6).expect("6 is valid");
/// assert_eq!(usdc.parse_units(1), 1_000_000);
/// assert_eq!(usdc.precision_multiplier(), 1_000_000_000_000);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Decimals(u8);

impl Default for Decimals {
    fn default() -> Self {
        Self::MAX
    }
}

impl Decimals {
    /// Zero decimal places.
    pub const ZERO: Self = Self(0);

    /// Maximum standard decimal places (18).
    pub const MAX: Self = Self(MAX_DECIMALS);

    /// Creates a new `Decimals` value after validating the range.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidPrecision`] if `value` exceeds 18.
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_DECIMALS {
            return Err(AdapterError::InvalidPrecision("decimals must be 0..=18"));
        }
        Ok(Self(value))
    }

    /// Returns the raw decimal count.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Returns `10^decimals`.
    #[must_use]
    pub const fn factor(&self) -> u128 {
        10u128.pow(self.0 as u32)
    }

    /// Returns `10^(18 - decimals)`, the multiplier that lifts a raw
    /// balance to 18-decimal precision.
    #[must_use]
    pub const fn precision_multiplier(&self) -> u128 {
        10u128.pow((MAX_DECIMALS - self.0) as u32)
    }

    /// Converts whole units to raw units: `1` with 6 decimals is `1_000_000`.
    ///
    /// Cannot overflow because `u64::MAX * 10^18 < u128::MAX`.
    #[must_use]
    pub const fn parse_units(&self, whole: u64) -> u128 {
        (whole as u128) * self.factor()
    }
}

impl TryFrom<u8> for Decimals {
    type Error = AdapterError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Decimals> for u8 {
    fn from(value: Decimals) -> Self {
        value.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        let (Ok(d0), Ok(d6), Ok(d18)) = (Decimals::new(0), Decimals::new(6), Decimals::new(18))
        else {
            panic!("expected Ok");
        };
        assert_eq!(d0, Decimals::ZERO);
        assert_eq!(d6.get(), 6);
        assert_eq!(d18, Decimals::MAX);
    }

    #[test]
    fn invalid_nineteen() {
        let Err(e) = Decimals::new(19) else {
            panic!("expected Err");
        };
        assert_eq!(e, AdapterError::InvalidPrecision("decimals must be 0..=18"));
    }

    #[test]
    fn precision_multiplier_normalises_to_eighteen() {
        let Ok(d6) = Decimals::new(6) else {
            panic!("expected Ok");
        };
        assert_eq!(d6.parse_units(1) * d6.precision_multiplier(), 10u128.pow(18));
        assert_eq!(Decimals::MAX.precision_multiplier(), 1);
    }

    #[test]
    fn parse_units_wbtc() {
        let Ok(d8) = Decimals::new(8) else {
            panic!("expected Ok");
        };
        assert_eq!(d8.parse_units(21), 2_100_000_000);
    }
}
