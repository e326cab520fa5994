//! StableSwap invariant solvers for pools of `n` coins.
//!
//! All balances are *normalised* (`xp`): raw balances lifted to a common
//! 18-decimal precision (and, for crypto pools, multiplied by a price
//! scale).  Intermediates are 256-bit.
//!
//! # Invariant
//!
//! ```text
//! A·nⁿ·Σx + D = A·D·nⁿ + D^(n+1) / (nⁿ·Πx)
//! ```
//!
//! With `Ann = A·n`, Newton-Raphson for `D`:
//!
//! ```text
//! D_P    = D^(n+1) / (nⁿ·Πx)
//! D_next = (Ann·S + n·D_P)·D / ((Ann − 1)·D + (n + 1)·D_P)
//! ```
//!
//! and for the balance `y` of coin `j` once coin `i` is set to `x`:
//!
//! ```text
//! c      = D^(n+1) / (nⁿ·Π'x·Ann·n)       Π' and S' skip coin j
//! b      = S' + D / Ann
//! y_next = (y² + c) / (2y + b − D)
//! ```
//!
//! Each solver reports how many iterations it ran; the host charges gas
//! per iteration.

use alloy_primitives::U256;

use super::checked::{add, div, mul, mul_div, sub};
use crate::error::{AdapterError, Result};

/// Maximum Newton-Raphson iterations before declaring non-convergence.
pub const MAX_ITERATIONS: u32 = 256;

/// Convergence threshold: absolute difference of consecutive iterates.
const CONVERGENCE_THRESHOLD: u64 = 1;

/// A solver result together with the iteration count that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// Converged value.
    pub value: U256,
    /// Newton-Raphson iterations consumed.
    pub iterations: u32,
}

fn converged(a: U256, b: U256) -> bool {
    let diff = if a > b { a - b } else { b - a };
    diff <= U256::from(CONVERGENCE_THRESHOLD)
}

/// Computes the invariant `D` for normalised balances `xp`.
///
/// # Errors
///
/// - [`AdapterError::DivisionByZero`] if some but not all balances are zero.
/// - [`AdapterError::Overflow`] if an intermediate exceeds 256 bits.
/// - [`AdapterError::NewtonRaphsonNonConvergence`] after
///   [`MAX_ITERATIONS`] steps.
pub fn compute_d(xp: &[U256], amp: U256) -> Result<Solution> {
    let n = U256::from(xp.len());
    let mut s = U256::ZERO;
    for x in xp {
        s = add(s, *x, "D: S overflow")?;
    }
    if s.is_zero() {
        return Ok(Solution {
            value: U256::ZERO,
            iterations: 0,
        });
    }

    let ann = mul(amp, n, "D: A·n overflow")?;
    let ann_minus_one = sub(ann, U256::from(1u8), "D: A·n is zero")?;
    let n_plus_one = add(n, U256::from(1u8), "D: n+1 overflow")?;

    let mut d = s;
    for iteration in 1..=MAX_ITERATIONS {
        let mut d_p = d;
        for x in xp {
            d_p = mul_div(d_p, d, mul(*x, n, "D: n·x overflow")?, "D: D_P overflow")?;
        }
        let d_prev = d;

        let numerator = mul(
            add(
                mul(ann, s, "D: Ann·S overflow")?,
                mul(d_p, n, "D: n·D_P overflow")?,
                "D: numerator overflow",
            )?,
            d,
            "D: numerator overflow",
        )?;
        let denominator = add(
            mul(ann_minus_one, d, "D: denominator overflow")?,
            mul(n_plus_one, d_p, "D: denominator overflow")?,
            "D: denominator overflow",
        )?;
        d = div(numerator, denominator)?;

        if converged(d, d_prev) {
            return Ok(Solution {
                value: d,
                iterations: iteration,
            });
        }
    }

    Err(AdapterError::NewtonRaphsonNonConvergence(
        "D computation did not converge within 256 iterations",
    ))
}

/// Computes the new balance of coin `j` when coin `i` is moved to `x`,
/// keeping `D` constant.
///
/// The reported iteration count includes the iterations spent on `D`.
///
/// # Errors
///
/// - [`AdapterError::TokenIndexOutOfRange`] if `i == j` or either index
///   is outside `xp`.
/// - Any error from [`compute_d`], plus overflow and non-convergence of
///   the `y` iteration.
pub fn compute_y(i: usize, j: usize, x: U256, xp: &[U256], amp: U256) -> Result<Solution> {
    if i == j || i >= xp.len() || j >= xp.len() {
        return Err(AdapterError::TokenIndexOutOfRange);
    }
    let n = U256::from(xp.len());
    let d_solution = compute_d(xp, amp)?;
    let d = d_solution.value;
    let ann = mul(amp, n, "y: A·n overflow")?;

    let mut c = d;
    let mut s = U256::ZERO;
    for (k, balance) in xp.iter().enumerate() {
        let x_k = if k == i {
            x
        } else if k != j {
            *balance
        } else {
            continue;
        };
        s = add(s, x_k, "y: S' overflow")?;
        c = mul_div(c, d, mul(x_k, n, "y: n·x overflow")?, "y: c overflow")?;
    }
    c = mul_div(c, d, mul(ann, n, "y: Ann·n overflow")?, "y: c overflow")?;
    let b = add(s, div(d, ann)?, "y: b overflow")?;

    let mut y = d;
    for iteration in 1..=MAX_ITERATIONS {
        let y_prev = y;
        let numerator = add(mul(y, y, "y: y² overflow")?, c, "y: numerator overflow")?;
        let denominator = sub(
            add(mul(U256::from(2u8), y, "y: 2y overflow")?, b, "y: 2y+b overflow")?,
            d,
            "y: 2y+b−D underflow",
        )?;
        y = div(numerator, denominator)?;

        if converged(y, y_prev) {
            return Ok(Solution {
                value: y,
                iterations: d_solution.iterations + iteration,
            });
        }
    }

    Err(AdapterError::NewtonRaphsonNonConvergence(
        "y computation did not converge within 256 iterations",
    ))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn xp(values: &[u128]) -> Vec<U256> {
        values.iter().map(|v| U256::from(*v)).collect()
    }

    #[test]
    fn d_of_empty_pool_is_zero() {
        let Ok(sol) = compute_d(&xp(&[0, 0, 0]), U256::from(100u32)) else {
            panic!("expected Ok");
        };
        assert_eq!(sol.value, U256::ZERO);
        assert_eq!(sol.iterations, 0);
    }

    #[test]
    fn d_of_balanced_pool_is_sum() {
        let balances = xp(&[1_000_000 * E18, 1_000_000 * E18, 1_000_000 * E18]);
        let Ok(sol) = compute_d(&balances, U256::from(200u32)) else {
            panic!("expected Ok");
        };
        let sum = U256::from(3_000_000 * E18);
        let diff = if sol.value > sum { sol.value - sum } else { sum - sol.value };
        assert!(diff <= U256::from(3u8), "D = {} vs S = {sum}", sol.value);
        assert!(sol.iterations >= 1);
    }

    #[test]
    fn d_with_one_empty_coin_divides_by_zero() {
        let Err(e) = compute_d(&xp(&[E18, 0]), U256::from(100u32)) else {
            panic!("expected Err");
        };
        assert_eq!(e, AdapterError::DivisionByZero);
    }

    #[test]
    fn y_recovers_current_balance() {
        let balances = xp(&[500_000 * E18, 500_000 * E18]);
        let Ok(sol) = compute_y(0, 1, balances[0], &balances, U256::from(100u32)) else {
            panic!("expected Ok");
        };
        let diff = if sol.value > balances[1] {
            sol.value - balances[1]
        } else {
            balances[1] - sol.value
        };
        assert!(diff <= U256::from(2u8));
    }

    #[test]
    fn higher_amp_means_less_slippage() {
        let balances = xp(&[1_000_000 * E18, 1_000_000 * E18]);
        let x = U256::from(1_100_000 * E18);
        let (Ok(low), Ok(high)) = (
            compute_y(0, 1, x, &balances, U256::from(10u32)),
            compute_y(0, 1, x, &balances, U256::from(1_000u32)),
        ) else {
            panic!("expected Ok");
        };
        // lower remaining y means more output
        assert!(high.value < low.value);
    }

    #[test]
    fn three_coin_swap_is_near_par() {
        let balances = xp(&[1_000_000 * E18, 1_000_000 * E18, 1_000_000 * E18]);
        let dx = 1_000 * E18;
        let Ok(sol) = compute_y(
            2,
            0,
            balances[2] + U256::from(dx),
            &balances,
            U256::from(200u32),
        ) else {
            panic!("expected Ok");
        };
        let dy = balances[0] - sol.value;
        assert!(dy < U256::from(dx));
        assert!(dy > U256::from(dx / 1_000 * 999));
    }

    #[test]
    fn identical_indices_rejected() {
        let balances = xp(&[E18, E18]);
        assert_eq!(
            compute_y(1, 1, U256::from(E18), &balances, U256::from(100u32)),
            Err(AdapterError::TokenIndexOutOfRange)
        );
        assert_eq!(
            compute_y(0, 2, U256::from(E18), &balances, U256::from(100u32)),
            Err(AdapterError::TokenIndexOutOfRange)
        );
    }
}
