//! Token-to-slot mapping for indexed pools.

use alloy_primitives::Address;

use crate::domain::Slot;

/// Cached slot of every token an indexed pool exposes to callers.
///
/// Built once from the pool's immutable coin list.  Lookups are total:
/// any token outside the list resolves to [`Slot::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenResolver {
    entries: Vec<(Address, Slot)>,
}

impl TokenResolver {
    /// Maps coin `k` of `coins` to [`Slot::Index(k)`](Slot::Index).
    #[must_use]
    pub fn indexed(coins: &[Address]) -> Self {
        Self {
            entries: coins
                .iter()
                .enumerate()
                .map(|(index, coin)| (*coin, Slot::Index(index)))
                .collect(),
        }
    }

    /// Maps each `(wrapped, underlying)` coin to a
    /// [`Slot::Wrapped`] keyed by the underlying token.
    #[must_use]
    pub fn wrapped(coins: &[(Address, Address)]) -> Self {
        Self {
            entries: coins
                .iter()
                .enumerate()
                .map(|(index, (wrapped, underlying))| {
                    (
                        *underlying,
                        Slot::Wrapped {
                            index,
                            wrapped: *wrapped,
                            underlying: *underlying,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Slot of `token`.
    #[must_use]
    pub fn resolve(&self, token: Address) -> Slot {
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map_or(Slot::Unsupported, |(_, slot)| *slot)
    }

    /// Returns `true` if `token` has a slot.
    #[must_use]
    pub fn is_pool_token(&self, token: Address) -> bool {
        self.resolve(token).is_supported()
    }

    /// Slots of `from` and `to`, or `None` if either is unsupported or
    /// they coincide.
    #[must_use]
    pub fn pair(&self, from: Address, to: Address) -> Option<(Slot, Slot)> {
        if from == to {
            return None;
        }
        let (a, b) = (self.resolve(from), self.resolve(to));
        (a.is_supported() && b.is_supported()).then_some((a, b))
    }

    /// Coin indices of `from` and `to`.
    #[must_use]
    pub fn indices(&self, from: Address, to: Address) -> Option<(usize, usize)> {
        let (a, b) = self.pair(from, to)?;
        Some((a.index()?, b.index()?))
    }

    /// Caller-visible token of coin `index`.
    #[must_use]
    pub fn token_at(&self, index: usize) -> Option<Address> {
        self.entries.get(index).map(|(t, _)| *t)
    }

    /// Tokens callers may trade, in coin order.
    pub fn tokens(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::with_last_byte(b)
    }

    #[test]
    fn unknown_token_is_unsupported() {
        let r = TokenResolver::indexed(&[addr(1), addr(2)]);
        assert_eq!(r.resolve(addr(2)), Slot::Index(1));
        assert_eq!(r.resolve(addr(9)), Slot::Unsupported);
        assert_eq!(r.indices(addr(2), addr(1)), Some((1, 0)));
        assert_eq!(r.indices(addr(1), addr(9)), None);
        assert_eq!(r.indices(addr(1), addr(1)), None);
    }

    #[test]
    fn wrapped_slots_key_on_underlying() {
        let r = TokenResolver::wrapped(&[(addr(0xa1), addr(1)), (addr(0xa2), addr(2))]);
        assert!(r.is_pool_token(addr(1)));
        assert!(!r.is_pool_token(addr(0xa1)));
        assert_eq!(
            r.resolve(addr(2)),
            Slot::Wrapped {
                index: 1,
                wrapped: addr(0xa2),
                underlying: addr(2),
            }
        );
        assert_eq!(r.tokens().collect::<Vec<_>>(), vec![addr(1), addr(2)]);
    }
}
