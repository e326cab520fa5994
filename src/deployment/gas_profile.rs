//! Empirical bounds for an adapter's self-reported gas estimate.
//!
//! A router adds [`Adapter::swap_gas_estimate`] to its path cost, so the
//! estimate must cover the worst observed query-plus-swap without
//! inflating it.  The accepted window is
//!
//! ```text
//! max_observed ≤ estimate ≤ max_observed · 1.10
//! ```

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::domain::{Amount, Gas};
use crate::error::{AdapterError, Result};
use crate::host::Chain;
use crate::traits::Adapter;

/// Upper margin of the accepted window, in basis points.
pub const MAX_MARGIN_BPS: u64 = 1_000;

/// Gas observed for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSample {
    /// Input token.
    pub from: Address,
    /// Output token.
    pub to: Address,
    /// Input amount.
    pub amount_in: Amount,
    /// Output the swap delivered.
    pub amount_out: Amount,
    /// Gas of the `query` transaction.
    pub query_gas: Gas,
    /// Gas of the `swap` transaction.
    pub swap_gas: Gas,
}

impl GasSample {
    /// Query plus swap.
    #[must_use]
    pub fn combined(&self) -> Gas {
        self.query_gas + self.swap_gas
    }
}

/// Gas samples over a representative set of trades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasProfile {
    samples: Vec<GasSample>,
}

impl GasProfile {
    /// Quotes and executes each `(from, to, amount_in)` trade against a
    /// private copy of `chain`, metering both transactions.
    ///
    /// Each swap uses the preceding quote as its minimum output.  `chain`
    /// itself is left untouched.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidConfiguration`] if `trades` is empty.
    /// - [`AdapterError::InsufficientOutput`] if a swap delivers less than
    ///   its quote.
    /// - Any error from the quote or swap of a trade.
    pub fn measure<A: Adapter>(
        chain: &Chain,
        adapter: &A,
        trades: &[(Address, Address, Amount)],
    ) -> Result<Self> {
        if trades.is_empty() {
            return Err(AdapterError::InvalidConfiguration(
                "gas profile needs at least one trade",
            ));
        }
        let samples = trades
            .iter()
            .map(|&(from, to, amount_in)| {
                let mut sim = chain.clone();
                sim.ledger_mut()
                    .set_balance(from, adapter.address(), amount_in)?;
                let (quote, query_gas) = sim.metered(|c| adapter.query(c, amount_in, from, to));
                let quote = quote?;
                let trader = sim.create_account();
                let (swapped, swap_gas) =
                    sim.metered_mut(|c| adapter.swap(c, amount_in, quote, from, to, trader));
                let amount_out = swapped?;
                if amount_out < quote {
                    return Err(AdapterError::InsufficientOutput {
                        amount_out,
                        min_out: quote,
                    });
                }
                debug!(
                    adapter = adapter.name(),
                    %from,
                    %to,
                    %amount_in,
                    %amount_out,
                    %query_gas,
                    %swap_gas,
                    "gas sample"
                );
                Ok(GasSample {
                    from,
                    to,
                    amount_in,
                    amount_out,
                    query_gas,
                    swap_gas,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { samples })
    }

    /// Every sample, in trade order.
    #[must_use]
    pub fn samples(&self) -> &[GasSample] {
        &self.samples
    }

    /// Largest query-plus-swap cost observed.
    #[must_use]
    pub fn max_combined(&self) -> Gas {
        self.samples
            .iter()
            .map(GasSample::combined)
            .max()
            .unwrap_or(Gas::ZERO)
    }

    /// Accepted window `[max, max · 1.10]`.
    #[must_use]
    pub fn window(&self) -> (Gas, Gas) {
        let max = self.max_combined();
        (max, max.with_margin_bps(MAX_MARGIN_BPS))
    }

    /// An estimate `margin_bps` above the observed maximum.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] if `margin_bps`
    /// exceeds [`MAX_MARGIN_BPS`].
    pub fn calibrated_estimate(&self, margin_bps: u64) -> Result<Gas> {
        if margin_bps > MAX_MARGIN_BPS {
            return Err(AdapterError::InvalidConfiguration(
                "margin above 10% leaves the accepted window",
            ));
        }
        Ok(self.max_combined().with_margin_bps(margin_bps))
    }

    /// Checks `estimate` against the accepted window.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::GasEstimateOutOfBounds`] outside the window.
    pub fn check(&self, estimate: Gas) -> Result<()> {
        let (min, max) = self.window();
        if estimate < min || estimate > max {
            warn!(%estimate, %min, %max, "gas estimate outside window");
            return Err(AdapterError::GasEstimateOutOfBounds { estimate, min, max });
        }
        Ok(())
    }
}
