//! Unordered pair of distinct token addresses.

use alloy_primitives::Address;

use crate::error::{AdapterError, Result};

/// A pair of distinct token addresses, canonically sorted.
///
/// The canonical ordering guarantees `token0 < token1`, so `(A, B)` and
/// `(B, A)` produce the same key.  Constant-product factories register
/// their pairs under this key.
///
/// # Examples
///
/// ```
/// use alloy_primitives::Address;
/// use hydra_adapters::domain::TokenPair;
///
/// let a = Address::with_last_byte(1);
/// let b = Address::with_last_byte(2);
/// let pair = TokenPair::new(b, a).expect("distinct tokens");
/// assert_eq!(pair.token0(), a);
/// assert_eq!(pair, TokenPair::new(a, b).expect("distinct tokens"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenPair {
    token0: Address,
    token1: Address,
}

impl TokenPair {
    /// Creates a new canonically-ordered `TokenPair`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] if both addresses are
    /// equal or either is the zero address.
    pub fn new(a: Address, b: Address) -> Result<Self> {
        if a == b {
            return Err(AdapterError::InvalidConfiguration(
                "token pair requires two distinct addresses",
            ));
        }
        if a.is_zero() || b.is_zero() {
            return Err(AdapterError::InvalidConfiguration(
                "token pair cannot contain the zero address",
            ));
        }
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { token0, token1 })
    }

    /// Returns the lower address.
    #[must_use]
    pub const fn token0(&self) -> Address {
        self.token0
    }

    /// Returns the higher address.
    #[must_use]
    pub const fn token1(&self) -> Address {
        self.token1
    }

    /// Returns `true` if `token` is one side of the pair.
    #[must_use]
    pub fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }
}
