//! Token identity type.

use alloy_primitives::Address;

use super::Decimals;

/// The identity of a token on the host chain: its contract address and
/// its decimal precision.
///
/// # Examples
///
/// ```
/// use alloy_primitives::Address;
/// use hydra_adapters::domain::{Decimals, Token};
///
/// let usdc = Token::new(Address::with_last_byte(1), Decimals::new(6).expect("valid"));
/// assert_eq!(usdc.parse_units(250), 250_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    address: Address,
    decimals: Decimals,
}

impl Token {
    /// Creates a new `Token`.
    #[must_use]
    pub const fn new(address: Address, decimals: Decimals) -> Self {
        Self { address, decimals }
    }

    /// Returns the token address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the token decimals.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }

    /// Converts whole units to raw units of this token.
    #[must_use]
    pub const fn parse_units(&self, whole: u64) -> u128 {
        self.decimals.parse_units(whole)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let Ok(d) = Decimals::new(8) else {
            panic!("valid decimals");
        };
        let wbtc = Token::new(Address::with_last_byte(7), d);
        assert_eq!(wbtc.address(), Address::with_last_byte(7));
        assert_eq!(wbtc.decimals().get(), 8);
        assert_eq!(wbtc.parse_units(1), 100_000_000);
    }

    #[test]
    fn equality_requires_same_decimals() {
        let (Ok(d6), Ok(d18)) = (Decimals::new(6), Decimals::new(18)) else {
            panic!("valid decimals");
        };
        let addr = Address::with_last_byte(1);
        assert_ne!(Token::new(addr, d6), Token::new(addr, d18));
    }
}
