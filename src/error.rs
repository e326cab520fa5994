//! Unified error type for adapters, the host ledger and the simulated
//! destination protocols.
//!
//! Every fallible operation in the crate returns [`Result<T>`], an alias for
//! `core::result::Result<T, AdapterError>`.  Destination failures surface
//! through the same enum so a revert inside a pool reaches the caller with
//! its original cause intact.

use alloy_primitives::Address;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{Amount, Gas};

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AdapterError>;

/// Errors raised by adapters, the host and destination protocols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    // -- Adapter surface ------------------------------------------------------
    /// The adapter cannot route `from` into `to`.
    #[error("unsupported pair: {from} -> {to}")]
    UnsupportedPair {
        /// Input token.
        from: Address,
        /// Output token.
        to: Address,
    },

    /// Delivered output fell below the caller's minimum.
    #[error("insufficient output: got {amount_out}, required {min_out}")]
    InsufficientOutput {
        /// Amount that reached the recipient.
        amount_out: Amount,
        /// Caller-supplied floor.
        min_out: Amount,
    },

    // -- Ledger ---------------------------------------------------------------
    /// An account tried to move more of a token than it holds.
    #[error("insufficient balance of {token} for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        /// Token being moved.
        token: Address,
        /// Account being debited.
        account: Address,
        /// Amount requested.
        needed: Amount,
        /// Amount held.
        available: Amount,
    },

    /// Address is not a registered token.
    #[error("unknown token: {0}")]
    UnknownToken(Address),

    /// No contract is deployed at the address.
    #[error("no contract deployed at {0}")]
    UnknownContract(Address),

    /// A contract exists at the address but is not of the expected kind.
    #[error("contract at {address} is not a {expected}")]
    WrongContractKind {
        /// Address that was called.
        address: Address,
        /// Kind the caller expected.
        expected: &'static str,
    },

    // -- Destination protocols ------------------------------------------------
    /// The pool does not hold enough of the output token.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// A pool invariant check failed after settlement.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),

    /// Token index outside the pool's coin list.
    #[error("token index out of range")]
    TokenIndexOutOfRange,

    /// The pool is paused or swaps are disabled.
    #[error("swaps disabled: {0}")]
    SwapsDisabled(&'static str),

    /// The vault's debt ceiling for the input token would be exceeded.
    #[error("max USDG exceeded for {0}")]
    MaxUsdgExceeded(Address),

    /// A protocol received a zero or otherwise unusable amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// The transaction deadline has passed.
    #[error("deadline expired")]
    DeadlineExpired,

    // -- Arithmetic -----------------------------------------------------------
    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A Newton-Raphson solver exhausted its iteration budget.
    #[error("Newton-Raphson did not converge: {0}")]
    NewtonRaphsonNonConvergence(&'static str),

    // -- Construction and deployment ------------------------------------------
    /// Invalid value supplied to a constructor.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Invalid decimal precision.
    #[error("invalid precision: {0}")]
    InvalidPrecision(&'static str),

    /// Declared pool token count does not match the pool.
    #[error("invalid token count for pool {pool}: expected {expected}")]
    TokenCountMismatch {
        /// Pool address.
        pool: Address,
        /// Declared count.
        expected: usize,
    },

    /// Gas estimate lies outside the accepted window.
    #[error("gas estimate {estimate} outside [{min}, {max}]")]
    GasEstimateOutOfBounds {
        /// Declared estimate.
        estimate: Gas,
        /// Lower bound (max observed).
        min: Gas,
        /// Upper bound.
        max: Gas,
    },

    /// Loading or validating the registry configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = AdapterError::Overflow("reserve product");
        assert_eq!(err.to_string(), "arithmetic overflow: reserve product");
    }

    #[test]
    fn insufficient_output_display() {
        let err = AdapterError::InsufficientOutput {
            amount_out: Amount::new(9),
            min_out: Amount::new(10),
        };
        assert_eq!(err.to_string(), "insufficient output: got 9, required 10");
    }

    #[test]
    fn config_error_converts() {
        let err: AdapterError = ConfigError::UnknownNetwork("sepolia".to_string()).into();
        assert_eq!(err.to_string(), "unknown network: sepolia");
        assert!(matches!(err, AdapterError::Config(_)));
    }
}
