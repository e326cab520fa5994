//! Downward corrections applied to a destination's native price view.

use core::fmt;

use super::{Amount, BasisPoints, Rounding};
use crate::error::Result;

/// How far an adapter marks down the figure reported by the destination's
/// own pricing view so that the quote never exceeds what settlement pays.
///
/// Each adapter variant carries one fixed correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteCorrection {
    /// The view is exact.
    None,
    /// The view reports one smallest unit more than settlement delivers.
    SmallestUnit,
    /// The view overstates execution by up to the given proportion.
    Haircut(BasisPoints),
}

impl QuoteCorrection {
    /// Applies the correction to a native view amount.
    ///
    /// `SmallestUnit` floors at zero so a zero view stays zero.
    ///
    /// # Errors
    ///
    /// Propagates overflow or an invalid haircut from [`BasisPoints::retain`].
    pub fn apply(&self, native: Amount) -> Result<Amount> {
        match self {
            Self::None => Ok(native),
            Self::SmallestUnit => Ok(native.checked_sub(&Amount::ONE).unwrap_or(Amount::ZERO)),
            Self::Haircut(bps) => bps.retain(native, Rounding::Down),
        }
    }
}

impl fmt::Display for QuoteCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "exact"),
            Self::SmallestUnit => write!(f, "-1 unit"),
            Self::Haircut(bps) => write!(f, "-{bps}"),
        }
    }
}
