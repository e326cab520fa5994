//! Resolution of a token address to its position inside a pool.

use alloy_primitives::Address;

/// Where a token lives inside a destination pool.
///
/// Adapters compute slots once at construction from the pool's immutable
/// coin list.  A token outside the list resolves to
/// [`Slot::Unsupported`]; that is a normal answer, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The token is coin `index` of the pool.
    Index(usize),
    /// The token is the underlying asset of coin `index`, which the pool
    /// holds in its `wrapped` form.
    Wrapped {
        /// Coin index of the wrapped token.
        index: usize,
        /// Wrapped token held by the pool.
        wrapped: Address,
        /// Underlying token seen by callers.
        underlying: Address,
    },
    /// The pool cannot trade the token.
    Unsupported,
}

impl Slot {
    /// Returns the pool coin index, if the token is supported.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Index(i) | Self::Wrapped { index: i, .. } => Some(*i),
            Self::Unsupported => None,
        }
    }

    /// Returns `true` unless the slot is [`Slot::Unsupported`].
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_each_variant() {
        assert_eq!(Slot::Index(2).index(), Some(2));
        let wrapped = Slot::Wrapped {
            index: 1,
            wrapped: Address::with_last_byte(0xa1),
            underlying: Address::with_last_byte(0x01),
        };
        assert_eq!(wrapped.index(), Some(1));
        assert_eq!(Slot::Unsupported.index(), None);
        assert!(!Slot::Unsupported.is_supported());
    }
}
