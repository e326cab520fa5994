//! Enum dispatch over every deployable destination contract.
//!
//! [`Contract`] wraps each simulated protocol behind a single enum so the
//! [`Chain`](super::Chain) can hold a heterogeneous contract table without
//! trait objects.  [`ContractKind`] recovers the concrete type at a call
//! site.

#[cfg(feature = "stableswap")]
use crate::protocols::crypto::CryptoPool;
#[cfg(feature = "stableswap")]
use crate::protocols::curve::CurvePool;
#[cfg(feature = "stableswap")]
use crate::protocols::lending::LendingMarket;
#[cfg(feature = "stableswap")]
use crate::protocols::saddle::SaddlePool;
#[cfg(feature = "constant-product")]
use crate::protocols::unilike::{UnilikeFactory, UnilikePair};
#[cfg(feature = "vault")]
use crate::protocols::vault::Vault;
#[cfg(feature = "stableswap")]
use crate::protocols::CoinList;

/// A deployed destination contract.
#[derive(Debug, Clone)]
pub enum Contract {
    /// Constant-product pair factory.
    #[cfg(feature = "constant-product")]
    UnilikeFactory(Box<UnilikeFactory>),

    /// Constant-product pair.
    #[cfg(feature = "constant-product")]
    UnilikePair(Box<UnilikePair>),

    /// StableSwap pool with `uint8` token indices and exact settlement.
    #[cfg(feature = "stableswap")]
    SaddlePool(Box<SaddlePool>),

    /// StableSwap pool with `int128` coin indices.
    #[cfg(feature = "stableswap")]
    CurvePool(Box<CurvePool>),

    /// Dynamic-fee pool with `uint256` coin indices.
    #[cfg(feature = "stableswap")]
    CryptoPool(Box<CryptoPool>),

    /// Lending market minting interest-bearing wrappers.
    #[cfg(feature = "stableswap")]
    LendingMarket(Box<LendingMarket>),

    /// Oracle-priced multi-asset vault.
    #[cfg(feature = "vault")]
    Vault(Box<Vault>),
}

/// Generates a match arm for each feature-gated variant.
macro_rules! delegate {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "constant-product")]
            Contract::UnilikeFactory($inner) => $body,
            #[cfg(feature = "constant-product")]
            Contract::UnilikePair($inner) => $body,
            #[cfg(feature = "stableswap")]
            Contract::SaddlePool($inner) => $body,
            #[cfg(feature = "stableswap")]
            Contract::CurvePool($inner) => $body,
            #[cfg(feature = "stableswap")]
            Contract::CryptoPool($inner) => $body,
            #[cfg(feature = "stableswap")]
            Contract::LendingMarket($inner) => $body,
            #[cfg(feature = "vault")]
            Contract::Vault($inner) => $body,
        }
    };
}

impl Contract {
    /// Human-readable kind of the wrapped contract.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        delegate!(self, inner => inner.kind_name())
    }

    /// Returns the pool's indexed coin list, for pools that have one.
    #[cfg(feature = "stableswap")]
    #[must_use]
    pub fn as_coin_list(&self) -> Option<&dyn CoinList> {
        match self {
            Contract::SaddlePool(pool) => Some(&**pool as &dyn CoinList),
            Contract::CurvePool(pool) => Some(&**pool as &dyn CoinList),
            Contract::CryptoPool(pool) => Some(&**pool as &dyn CoinList),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

/// A concrete contract type that can live in the [`Contract`] table.
pub trait ContractKind: Sized {
    /// Name used in [`WrongContractKind`](crate::error::AdapterError::WrongContractKind).
    const KIND: &'static str;

    /// Wraps the contract for storage.
    fn wrap(self) -> Contract;

    /// Borrows the concrete contract if `contract` holds one.
    fn downcast(contract: &Contract) -> Option<&Self>;

    /// Mutably borrows the concrete contract if `contract` holds one.
    fn downcast_mut(contract: &mut Contract) -> Option<&mut Self>;

    /// Returns [`Self::KIND`] from an instance.
    fn kind_name(&self) -> &'static str {
        Self::KIND
    }
}

macro_rules! contract_kind {
    ($variant:ident, $ty:ty) => {
        impl ContractKind for $ty {
            const KIND: &'static str = stringify!($variant);

            fn wrap(self) -> Contract {
                Contract::$variant(Box::new(self))
            }

            fn downcast(contract: &Contract) -> Option<&Self> {
                match contract {
                    Contract::$variant(inner) => Some(&**inner),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn downcast_mut(contract: &mut Contract) -> Option<&mut Self> {
                match contract {
                    Contract::$variant(inner) => Some(&mut **inner),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

#[cfg(feature = "constant-product")]
contract_kind!(UnilikeFactory, UnilikeFactory);
#[cfg(feature = "constant-product")]
contract_kind!(UnilikePair, UnilikePair);
#[cfg(feature = "stableswap")]
contract_kind!(SaddlePool, SaddlePool);
#[cfg(feature = "stableswap")]
contract_kind!(CurvePool, CurvePool);
#[cfg(feature = "stableswap")]
contract_kind!(CryptoPool, CryptoPool);
#[cfg(feature = "stableswap")]
contract_kind!(LendingMarket, LendingMarket);
#[cfg(feature = "vault")]
contract_kind!(Vault, Vault);
