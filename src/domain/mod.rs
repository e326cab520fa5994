//! Domain value types shared by adapters, the host and destination pools.
//!
//! Newtypes with validated constructors: amounts, basis points, decimals,
//! gas, token identities, pool slots and quote corrections.

mod amount;
mod basis_points;
mod decimals;
mod gas;
mod quote_correction;
mod rounding;
mod slot;
mod token;
mod token_pair;

pub use amount::Amount;
pub use basis_points::BasisPoints;
pub use decimals::Decimals;
pub use gas::Gas;
pub use quote_correction::QuoteCorrection;
pub use rounding::Rounding;
pub use slot::Slot;
pub use token::Token;
pub use token_pair::TokenPair;
