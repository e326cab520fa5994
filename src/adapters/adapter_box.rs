//! Enum dispatch wrapper for all adapter families.
//!
//! [`AdapterBox`] lets a router hold adapters of different families in one
//! collection without trait objects.  Each variant is feature-gated to
//! match its protocol family.

use alloy_primitives::Address;

#[cfg(feature = "stableswap")]
use super::{CryptoAdapter, CurveAdapter, CurveLendingAdapter, SaddleAdapter};
#[cfg(feature = "vault")]
use super::GmxAdapter;
#[cfg(feature = "constant-product")]
use super::UnilikeAdapter;
use crate::domain::{Amount, Gas};
use crate::error::Result;
use crate::host::Chain;
use crate::traits::Adapter;

/// Zero-cost dispatch enum wrapping every concrete adapter.
#[derive(Debug, Clone)]
pub enum AdapterBox {
    /// Constant-product factory.
    #[cfg(feature = "constant-product")]
    Unilike(Box<UnilikeAdapter>),

    /// StableSwap pool with `uint8` indices.
    #[cfg(feature = "stableswap")]
    Saddle(Box<SaddleAdapter>),

    /// StableSwap pool with `int128` indices.
    #[cfg(feature = "stableswap")]
    Curve(Box<CurveAdapter>),

    /// StableSwap pool of lending wrappers, traded as underlyings.
    #[cfg(feature = "stableswap")]
    CurveLending(Box<CurveLendingAdapter>),

    /// Dynamic-fee crypto pool.
    #[cfg(feature = "stableswap")]
    Crypto(Box<CryptoAdapter>),

    /// Oracle-priced vault.
    #[cfg(feature = "vault")]
    Gmx(Box<GmxAdapter>),
}

/// Generates a match arm for each feature-gated variant.
macro_rules! delegate {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            #[cfg(feature = "constant-product")]
            AdapterBox::Unilike(a) => a.$method($($arg),*),
            #[cfg(feature = "stableswap")]
            AdapterBox::Saddle(a) => a.$method($($arg),*),
            #[cfg(feature = "stableswap")]
            AdapterBox::Curve(a) => a.$method($($arg),*),
            #[cfg(feature = "stableswap")]
            AdapterBox::CurveLending(a) => a.$method($($arg),*),
            #[cfg(feature = "stableswap")]
            AdapterBox::Crypto(a) => a.$method($($arg),*),
            #[cfg(feature = "vault")]
            AdapterBox::Gmx(a) => a.$method($($arg),*),
        }
    };
}

impl Adapter for AdapterBox {
    fn name(&self) -> &str {
        delegate!(self, name())
    }

    fn address(&self) -> Address {
        delegate!(self, address())
    }

    fn pool(&self) -> Address {
        delegate!(self, pool())
    }

    fn swap_gas_estimate(&self) -> Gas {
        delegate!(self, swap_gas_estimate())
    }

    fn is_pool_token(&self, chain: &Chain, token: Address) -> bool {
        delegate!(self, is_pool_token(chain, token))
    }

    fn query(&self, chain: &Chain, amount_in: Amount, from: Address, to: Address) -> Result<Amount> {
        delegate!(self, query(chain, amount_in, from, to))
    }

    fn swap(
        &self,
        chain: &mut Chain,
        amount_in: Amount,
        min_out: Amount,
        from: Address,
        to: Address,
        recipient: Address,
    ) -> Result<Amount> {
        delegate!(self, swap(chain, amount_in, min_out, from, to, recipient))
    }
}

macro_rules! boxed_from {
    ($feature:literal, $variant:ident, $ty:ty) => {
        #[cfg(feature = $feature)]
        impl From<$ty> for AdapterBox {
            fn from(adapter: $ty) -> Self {
                Self::$variant(Box::new(adapter))
            }
        }
    };
}

boxed_from!("constant-product", Unilike, UnilikeAdapter);
boxed_from!("stableswap", Saddle, SaddleAdapter);
boxed_from!("stableswap", Curve, CurveAdapter);
boxed_from!("stableswap", CurveLending, CurveLendingAdapter);
boxed_from!("stableswap", Crypto, CryptoAdapter);
boxed_from!("vault", Gmx, GmxAdapter);
