//! Gas schedule and meter.
//!
//! Every host operation charges a fixed cost from [`schedule`].  The meter
//! uses interior mutability so read-only views (quotes) are metered too.

use core::cell::Cell;

use crate::domain::Gas;

/// Fixed per-operation costs.
pub mod schedule {
    use crate::domain::Gas;

    /// Intrinsic cost of a top-level transaction.
    pub const TX_BASE: Gas = Gas::new(21_000);
    /// Cost of calling into a deployed contract.
    pub const CALL: Gas = Gas::new(2_600);
    /// Cost of reading a storage slot or a token balance.
    pub const SLOAD: Gas = Gas::new(2_100);
    /// Cost of writing a storage slot.
    pub const SSTORE: Gas = Gas::new(5_000);
    /// Cost of one Newton-Raphson iteration in a StableSwap solver.
    pub const NEWTON_STEP: Gas = Gas::new(450);
    /// Cost of minting or burning supply.
    pub const SUPPLY_UPDATE: Gas = Gas::new(7_100);
}

/// Running total of gas consumed on a [`Ledger`](super::Ledger).
#[derive(Debug, Clone, Default)]
pub struct GasMeter {
    used: Cell<u64>,
}

impl GasMeter {
    /// Creates a meter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `gas` to the running total.
    pub fn charge(&self, gas: Gas) {
        self.used.set(self.used.get().saturating_add(gas.get()));
    }

    /// Returns the total consumed so far.
    #[must_use]
    pub fn used(&self) -> Gas {
        Gas::new(self.used.get())
    }
}
