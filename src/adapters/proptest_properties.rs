//! Property-based tests using `proptest` for adapter invariants.
//!
//! 1. **Parity** — swapping with `min_out = query(..)` delivers exactly
//!    the quote (constant-product, Saddle, Curve) or at least the quote
//!    (crypto haircut).
//! 2. **Zero residual** — the adapter keeps none of the input or output.
//! 3. **Self pair** — `query(x, T, T) == 0`.
//! 4. **Minimum output** — asking one unit above the quote reverts with
//!    no balance change.
//! 5. **Gas window** — the constant-product estimate covers any pair depth
//!    and trade size.

use alloy_primitives::Address;
use proptest::prelude::*;

use super::{CryptoAdapter, CryptoVenue, CurveAdapter, CurvePlainVenue, SaddleAdapter, SaddleVenue};
use super::{UnilikeAdapter, UnilikeVenue};
use crate::deployment::GasProfile;
use crate::domain::{Amount, Gas, Token};
use crate::error::AdapterError;
use crate::host::Chain;
use crate::protocols::crypto::{CryptoFees, CryptoPool};
use crate::protocols::curve::CurvePool;
use crate::protocols::saddle::SaddlePool;
use crate::protocols::stableswap::PRECISION;
use crate::protocols::unilike::{create_pair, provide_liquidity, UnilikeFactory};
use crate::traits::Adapter;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

// Per-family swap gas estimates; see `tests/integration.rs` for the
// window each is checked against.
const UNILIKE_GAS: Gas = Gas::new(115_000);
const STABLESWAP_GAS: Gas = Gas::new(140_000);

fn tokens(chain: &mut Chain, symbols: &[(&str, u8)]) -> Vec<Token> {
    symbols
        .iter()
        .map(|(sym, dec)| {
            let Ok(t) = chain.create_token(sym, *dec) else {
                panic!("token {sym}");
            };
            t
        })
        .collect()
}

fn seed(chain: &mut Chain, provider: Address, tokens: &[Token], amounts: &[Amount]) {
    for (t, a) in tokens.iter().zip(amounts) {
        let Ok(()) = chain.ledger_mut().mint(t.address(), provider, *a) else {
            panic!("mint");
        };
    }
}

/// Funds the adapter, swaps with `min_out`, and returns the delivered
/// amount with the adapter's residual `from` and `to` balances.
fn fund_and_swap<A: Adapter>(
    chain: &mut Chain,
    adapter: &A,
    amount_in: Amount,
    min_out: Amount,
    from: Address,
    to: Address,
) -> (Result<Amount, AdapterError>, Address) {
    let trader = chain.create_account();
    let Ok(()) = chain.ledger_mut().mint(from, adapter.address(), amount_in) else {
        panic!("fund adapter");
    };
    (
        adapter.swap(chain, amount_in, min_out, from, to, trader),
        trader,
    )
}

// ---------------------------------------------------------------------------
// World builders
// ---------------------------------------------------------------------------

fn unilike_world(ra: u128, rb: u128) -> (Chain, UnilikeAdapter, Token, Token) {
    let mut chain = Chain::new();
    let t = tokens(&mut chain, &[("TKA", 18), ("TKB", 6)]);
    let Ok(factory) = UnilikeFactory::deploy(&mut chain, 3) else {
        panic!("factory");
    };
    let Ok(pair) = create_pair(&mut chain, factory, t[0].address(), t[1].address()) else {
        panic!("pair");
    };
    let (a0, a1) = if t[0].address() < t[1].address() { (ra, rb) } else { (rb, ra) };
    let Ok(()) = provide_liquidity(&mut chain, pair, Amount::new(a0), Amount::new(a1)) else {
        panic!("liquidity");
    };
    let Ok(venue) = UnilikeVenue::new(&chain, factory, 3) else {
        panic!("venue");
    };
    let Ok(adapter) = UnilikeAdapter::new(&mut chain, "UniswapV2Adapter", venue, UNILIKE_GAS) else {
        panic!("adapter");
    };
    (chain, adapter, t[0], t[1])
}

fn saddle_world(amp: u64, whole: u64) -> (Chain, SaddleAdapter, Vec<Token>) {
    let mut chain = Chain::new();
    let t = tokens(&mut chain, &[("USDC", 6), ("DAI", 18), ("USDT", 6)]);
    let Ok(pool) = SaddlePool::deploy(&mut chain, &t, amp, 4_000_000) else {
        panic!("pool");
    };
    let lp = chain.create_account();
    let amounts: Vec<Amount> = t.iter().map(|x| Amount::new(x.parse_units(whole))).collect();
    seed(&mut chain, lp, &t, &amounts);
    let Ok(()) = chain.call_mut::<SaddlePool, _, _>(pool, |p, l| p.add_liquidity(l, lp, &amounts)) else {
        panic!("liquidity");
    };
    let Ok(venue) = SaddleVenue::new(&chain, pool, 3) else {
        panic!("venue");
    };
    let Ok(adapter) = SaddleAdapter::new(&mut chain, "SaddleAdapter", venue, STABLESWAP_GAS) else {
        panic!("adapter");
    };
    (chain, adapter, t)
}

fn curve_world(amp: u64, whole: u64) -> (Chain, CurveAdapter, Vec<Token>) {
    let mut chain = Chain::new();
    let t = tokens(&mut chain, &[("DAI", 18), ("USDC", 6), ("USDT", 6)]);
    let Ok(pool) = CurvePool::deploy(&mut chain, &t, amp, 1_000_000) else {
        panic!("pool");
    };
    let lp = chain.create_account();
    let amounts: Vec<Amount> = t.iter().map(|x| Amount::new(x.parse_units(whole))).collect();
    seed(&mut chain, lp, &t, &amounts);
    let Ok(()) = chain.call_mut::<CurvePool, _, _>(pool, |p, l| p.add_liquidity(l, lp, &amounts)) else {
        panic!("liquidity");
    };
    let Ok(venue) = CurvePlainVenue::new(&chain, pool, 3) else {
        panic!("venue");
    };
    let Ok(adapter) = CurveAdapter::new(&mut chain, "Curve3poolAdapter", venue, STABLESWAP_GAS) else {
        panic!("adapter");
    };
    (chain, adapter, t)
}

fn crypto_world() -> (Chain, CryptoAdapter, Vec<Token>) {
    let mut chain = Chain::new();
    let t = tokens(&mut chain, &[("USDT", 6), ("WBTC", 8), ("WETH", 18)]);
    let scale = [PRECISION, 30_000 * PRECISION, 2_000 * PRECISION];
    let fees = CryptoFees {
        mid_fee: 5_000_000,
        out_fee: 8_000_000,
        fee_gamma: 10_000_000_000_000_000,
    };
    let Ok(pool) = CryptoPool::deploy(&mut chain, &t, &scale, 1_000, fees) else {
        panic!("pool");
    };
    let lp = chain.create_account();
    let amounts = [
        Amount::new(t[0].parse_units(30_000_000)),
        Amount::new(t[1].parse_units(1_000)),
        Amount::new(t[2].parse_units(15_000)),
    ];
    seed(&mut chain, lp, &t, &amounts);
    let Ok(()) = chain.call_mut::<CryptoPool, _, _>(pool, |p, l| p.add_liquidity(l, lp, &amounts)) else {
        panic!("liquidity");
    };
    let Ok(venue) = CryptoVenue::new(&chain, pool, 3) else {
        panic!("venue");
    };
    let Ok(adapter) = CryptoAdapter::new(&mut chain, "CurveAtricryptoAdapter", venue, STABLESWAP_GAS) else {
        panic!("adapter");
    };
    (chain, adapter, t)
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Raw reserves in [1e6, 1e15].
fn reserve_strategy() -> impl Strategy<Value = u128> {
    1_000_000u128..=1_000_000_000_000_000u128
}

/// Amplification in [10, 2000].
fn amp_strategy() -> impl Strategy<Value = u64> {
    10u64..=2_000u64
}

/// Pool depth per coin, in whole tokens.
fn depth_strategy() -> impl Strategy<Value = u64> {
    100_000u64..=50_000_000u64
}

/// A coin index pair with `i != j` among three coins.
fn direction_strategy() -> impl Strategy<Value = (usize, usize)> {
    (0usize..3, 1usize..3).prop_map(|(i, step)| (i, (i + step) % 3))
}

// ---------------------------------------------------------------------------
// Property 1 & 2: parity and zero residual
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_parity_constant_product(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        share in 1u128..=300u128,
    ) {
        let (mut chain, adapter, a, b) = unilike_world(ra, rb);
        let amount_in = Amount::new((ra * share / 1_000).max(1));
        let Ok(quote) = adapter.query(&chain, amount_in, a.address(), b.address()) else {
            panic!("query");
        };
        if quote.is_zero() { return Ok(()); }

        let (result, trader) = fund_and_swap(&mut chain, &adapter, amount_in, quote, a.address(), b.address());
        prop_assert_eq!(result, Ok(quote));
        prop_assert_eq!(chain.ledger().inspect_balance(b.address(), trader), quote);
        prop_assert_eq!(chain.ledger().inspect_balance(a.address(), adapter.address()), Amount::ZERO);
        prop_assert_eq!(chain.ledger().inspect_balance(b.address(), adapter.address()), Amount::ZERO);
    }

    #[test]
    fn prop_constant_product_gas_estimate_in_window(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        share in 1u128..=300u128,
    ) {
        let (chain, adapter, a, b) = unilike_world(ra, rb);
        let amount_in = Amount::new((ra * share / 1_000).max(1));
        let Ok(quote) = adapter.query(&chain, amount_in, a.address(), b.address()) else {
            panic!("query");
        };
        if quote.is_zero() { return Ok(()); }

        let Ok(profile) = GasProfile::measure(&chain, &adapter, &[(a.address(), b.address(), amount_in)]) else {
            panic!("measure");
        };
        prop_assert_eq!(profile.check(adapter.swap_gas_estimate()), Ok(()));
    }

    #[test]
    fn prop_parity_saddle(
        amp in amp_strategy(),
        depth in depth_strategy(),
        (i, j) in direction_strategy(),
        pct in 1u64..=20u64,
    ) {
        let (mut chain, adapter, t) = saddle_world(amp, depth);
        let amount_in = Amount::new(t[i].parse_units(depth / 100 * pct));
        let (from, to) = (t[i].address(), t[j].address());
        let Ok(quote) = adapter.query(&chain, amount_in, from, to) else {
            panic!("query");
        };
        let (result, trader) = fund_and_swap(&mut chain, &adapter, amount_in, quote, from, to);
        prop_assert_eq!(result, Ok(quote));
        prop_assert_eq!(chain.ledger().inspect_balance(to, trader), quote);
        prop_assert_eq!(chain.ledger().inspect_balance(to, adapter.address()), Amount::ZERO);
        prop_assert_eq!(chain.ledger().inspect_balance(from, adapter.address()), Amount::ZERO);
    }

    #[test]
    fn prop_parity_curve_after_unit_correction(
        amp in amp_strategy(),
        depth in depth_strategy(),
        (i, j) in direction_strategy(),
        pct in 1u64..=20u64,
    ) {
        let (mut chain, adapter, t) = curve_world(amp, depth);
        let amount_in = Amount::new(t[i].parse_units(depth / 100 * pct));
        let (from, to) = (t[i].address(), t[j].address());
        let Ok(quote) = adapter.query(&chain, amount_in, from, to) else {
            panic!("query");
        };
        let (result, trader) = fund_and_swap(&mut chain, &adapter, amount_in, quote, from, to);
        prop_assert_eq!(result, Ok(quote));
        prop_assert_eq!(chain.ledger().inspect_balance(to, trader), quote);
        prop_assert_eq!(chain.ledger().inspect_balance(to, adapter.address()), Amount::ZERO);
    }

    #[test]
    fn prop_crypto_quote_never_exceeds_delivery(
        (i, j) in direction_strategy(),
        bps_of_pool in 1u64..=300u64,
    ) {
        let (mut chain, adapter, t) = crypto_world();
        let whole: [u64; 3] = [30_000_000, 1_000, 15_000];
        let amount_in = Amount::new(
            t[i].parse_units(1).saturating_mul(u128::from(whole[i])) * u128::from(bps_of_pool) / 10_000,
        );
        let (from, to) = (t[i].address(), t[j].address());
        let Ok(quote) = adapter.query(&chain, amount_in, from, to) else {
            panic!("query");
        };
        let (result, trader) = fund_and_swap(&mut chain, &adapter, amount_in, quote, from, to);
        let Ok(delivered) = result else {
            panic!("swap at quote must succeed");
        };
        prop_assert!(delivered >= quote);
        prop_assert_eq!(chain.ledger().inspect_balance(to, trader), delivered);
        prop_assert_eq!(chain.ledger().inspect_balance(to, adapter.address()), Amount::ZERO);
    }
}

// ---------------------------------------------------------------------------
// Property 3 & 4: self pair and minimum output
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_self_pair_quotes_zero(
        amount in 1u128..=u128::from(u64::MAX),
        k in 0usize..3,
    ) {
        let (chain, adapter, t) = saddle_world(100, 1_000_000);
        let token = t[k].address();
        prop_assert_eq!(adapter.query(&chain, Amount::new(amount), token, token), Ok(Amount::ZERO));
    }

    #[test]
    fn prop_min_out_above_quote_reverts_cleanly(
        depth in depth_strategy(),
        (i, j) in direction_strategy(),
    ) {
        let (mut chain, adapter, t) = saddle_world(200, depth);
        let amount_in = Amount::new(t[i].parse_units(depth / 50));
        let (from, to) = (t[i].address(), t[j].address());
        let Ok(quote) = adapter.query(&chain, amount_in, from, to) else {
            panic!("query");
        };
        let greedy = Amount::new(quote.get() + 1);
        let (result, trader) = fund_and_swap(&mut chain, &adapter, amount_in, greedy, from, to);
        prop_assert_eq!(
            result,
            Err(AdapterError::InsufficientOutput { amount_out: quote, min_out: greedy })
        );
        prop_assert_eq!(chain.ledger().inspect_balance(from, adapter.address()), amount_in);
        prop_assert_eq!(chain.ledger().inspect_balance(to, trader), Amount::ZERO);
    }
}
