//! # Hydra Adapters
//!
//! Uniform quote-and-swap adapters over heterogeneous DEX liquidity.
//!
//! A router sees every liquidity source through one capability set,
//! [`Adapter`](traits::Adapter): `query` prices a trade, `swap` executes
//! it from tokens already in the adapter's custody, and
//! `swap_gas_estimate` reports what a hop costs.  Each adapter is bound to
//! one destination and translates that protocol's calling convention:
//! token indexing, pricing views, settlement rounding and custody flow.
//!
//! Families:
//!
//! - **Constant product** (Uniswap V2 style factory) — `constant-product` feature
//! - **StableSwap** (Saddle and Curve style, plain and lending-wrapped,
//!   plus the dynamic-fee crypto pool) — `stableswap` feature
//! - **Vault** (GMX style oracle pricing) — `vault` feature
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `constant-product` | yes | Factory pairs, `x · y = k` |
//! | `stableswap` | yes | Saddle, Curve, Curve lending and crypto pools |
//! | `vault` | yes | GMX style vault |
//! | `all-families` | yes | Enables all three |
//!
//! # Quick Start
//!
//! ```rust
//! use hydra_adapters::prelude::*;
//! use hydra_adapters::protocols::unilike::{create_pair, provide_liquidity, UnilikeFactory};
//!
//! let mut chain = Chain::new();
//! let usdc = chain.create_token("USDC", 6).expect("token");
//! let weth = chain.create_token("WETH", 18).expect("token");
//!
//! // 1. A factory with one funded pair
//! let factory = UnilikeFactory::deploy(&mut chain, 3).expect("factory");
//! let pair = create_pair(&mut chain, factory, usdc.address(), weth.address()).expect("pair");
//! let depth = Amount::new(10u128.pow(24));
//! provide_liquidity(&mut chain, pair, depth, depth).expect("liquidity");
//!
//! // 2. An adapter bound to the factory
//! let venue = UnilikeVenue::new(&chain, factory, 3).expect("venue");
//! let adapter = UnilikeAdapter::new(&mut chain, "UnilikeAdapter", venue, Gas::new(120_000))
//!     .expect("adapter");
//!
//! // 3. Quote, fund the adapter, swap
//! let amount_in = Amount::new(1_000_000);
//! let quote = adapter
//!     .query(&chain, amount_in, usdc.address(), weth.address())
//!     .expect("quote");
//! chain
//!     .ledger_mut()
//!     .mint(usdc.address(), adapter.address(), amount_in)
//!     .expect("fund");
//! let trader = chain.create_account();
//! let out = adapter
//!     .swap(&mut chain, amount_in, quote, usdc.address(), weth.address(), trader)
//!     .expect("swap");
//!
//! assert_eq!(out, quote);
//! assert_eq!(chain.ledger().inspect_balance(weth.address(), trader), quote);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Router     │  DeployOptions picks adapters, AdapterBox holds them
//! └──────┬──────┘
//!        │ query / swap / swap_gas_estimate
//!        ▼
//! ┌─────────────┐
//! │ PoolAdapter  │  custody, min-out, atomicity, quote correction
//! └──────┬──────┘
//!        │ Venue (resolve, quote, execute)
//!        ▼
//! ┌─────────────┐
//! │  Protocols   │  Unilike, Saddle, Curve, Crypto, Lending, Vault
//! └──────┬──────┘
//!        │ Chain::call / call_mut
//!        ▼
//! ┌─────────────┐
//! │    Host      │  Ledger balances, gas meter, atomic rollback
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Gas`](domain::Gas), [`Token`](domain::Token), etc. |
//! | [`traits`] | [`Adapter`](traits::Adapter) and the per-family [`Venue`](traits::Venue) seam |
//! | [`adapters`] | Token resolver, generic [`PoolAdapter`](adapters::PoolAdapter), venues and [`AdapterBox`](adapters::AdapterBox) |
//! | [`protocols`] | Simulated destination contracts, feature-gated per family |
//! | [`host`] | [`Chain`](host::Chain), [`Ledger`](host::Ledger) and the gas schedule |
//! | [`deployment`] | Token-count verification and gas-estimate calibration |
//! | [`config`] | [`DeployOptions`](config::DeployOptions) per-network registry tables |
//! | [`math`] | Checked 256-bit helpers and StableSwap solvers |
//! | [`error`] | [`AdapterError`](error::AdapterError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod adapters;
pub mod config;
pub mod deployment;
pub mod domain;
pub mod error;
pub mod host;
pub mod math;
pub mod prelude;
pub mod protocols;
pub mod traits;
