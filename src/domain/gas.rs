//! Gas units charged by the host and self-reported by adapters.

use core::fmt;
use core::ops::Add;

/// An amount of gas.
///
/// Arithmetic saturates: gas totals are metering output, never inputs to
/// pricing, and a saturated meter still orders correctly.
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
pub struct Gas(u64);

impl Gas {
    /// No gas.
    pub const ZERO: Self = Self(0);

    /// Creates a gas amount.
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Returns the raw unit count.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Multiplies by a scalar count (e.g. one charge per loop iteration).
    #[must_use]
    pub const fn times(&self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }

    /// Scales by `(10_000 + bps) / 10_000`, rounding down.
    #[must_use]
    pub const fn with_margin_bps(&self, bps: u64) -> Self {
        let scaled = (self.0 as u128) * (10_000 + bps as u128) / 10_000;
        if scaled > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(scaled as u64)
        }
    }
}

impl Add for Gas {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_times() {
        assert_eq!(Gas::new(2_100) + Gas::new(900), Gas::new(3_000));
        assert_eq!(Gas::new(400).times(3), Gas::new(1_200));
        assert_eq!(Gas::new(u64::MAX) + Gas::new(1), Gas::new(u64::MAX));
    }

    #[test]
    fn margin() {
        assert_eq!(Gas::new(100_000).with_margin_bps(1_000), Gas::new(110_000));
        assert_eq!(Gas::new(99_999).with_margin_bps(500), Gas::new(104_998));
    }
}
