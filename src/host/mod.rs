//! In-process host chain for adapters and destination protocols.
//!
//! | Type | Role |
//! |------|------|
//! | [`Ledger`] | token registry, balances, gas meter, block clock |
//! | [`Chain`] | ledger plus the contract table and atomic transactions |
//! | [`Contract`] | enum dispatch over the simulated destination contracts |
//! | [`schedule`] | fixed gas cost per host operation |

mod chain;
mod contract;
mod gas;
mod ledger;

pub use chain::Chain;
pub use contract::{Contract, ContractKind};
pub use gas::{schedule, GasMeter};
pub use ledger::{Ledger, TokenInfo};
