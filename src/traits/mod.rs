//! Core trait abstractions for quoting and executing swaps.
//!
//! [`Adapter`] is the uniform capability set a router sees for every
//! liquidity source.  [`Venue`] is the narrower seam each protocol family
//! implements: pair resolution, native pricing and native execution.  The
//! generic [`PoolAdapter`](crate::adapters::PoolAdapter) lifts any venue
//! into a full adapter.

mod adapter;
mod venue;

pub use adapter::Adapter;
pub use venue::Venue;
