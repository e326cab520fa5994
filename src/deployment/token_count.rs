//! Deployment-time verification of a pool's declared coin count.
//!
//! Indexed pools expose no coin-count getter, so an adapter is told how
//! many coins to enumerate.  Before the adapter is registered the count is
//! verified from outside: coin `n − 1` must exist and coin `n` must not.

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::adapters::{
    CryptoAdapter, CryptoVenue, CurveAdapter, CurveLendingAdapter, CurveLendingVenue,
    CurvePlainVenue, SaddleAdapter, SaddleVenue,
};
use crate::domain::Gas;
use crate::error::{AdapterError, Result};
use crate::host::{schedule, Chain};

/// Verifies that `pool` holds exactly `expected` coins.
///
/// # Errors
///
/// - [`AdapterError::UnknownContract`] if nothing is deployed at `pool`.
/// - [`AdapterError::WrongContractKind`] if `pool` has no indexed coin list.
/// - [`AdapterError::TokenCountMismatch`] if the pool has fewer or more
///   coins than `expected`.
pub fn check_token_count(chain: &Chain, pool: Address, expected: usize) -> Result<()> {
    let coins = chain
        .contract_at(pool)?
        .as_coin_list()
        .ok_or(AdapterError::WrongContractKind {
            address: pool,
            expected: "indexed pool",
        })?;
    chain.ledger().charge(schedule::CALL.times(2));
    let last_exists = expected
        .checked_sub(1)
        .is_some_and(|last| coins.coin_at(last).is_ok());
    let next_missing = coins.coin_at(expected).is_err();
    if last_exists && next_missing {
        debug!(%pool, expected, "token count verified");
        Ok(())
    } else {
        warn!(%pool, expected, last_exists, next_missing, "token count mismatch");
        Err(AdapterError::TokenCountMismatch { pool, expected })
    }
}

/// Verifies the coin count, then binds a [`SaddleAdapter`] to `pool`.
///
/// # Errors
///
/// As [`check_token_count`], then any adapter construction error.
pub fn deploy_saddle_adapter(
    chain: &mut Chain,
    name: &str,
    pool: Address,
    token_count: u8,
    gas: Gas,
) -> Result<SaddleAdapter> {
    check_token_count(chain, pool, usize::from(token_count))?;
    let venue = SaddleVenue::new(chain, pool, token_count)?;
    SaddleAdapter::new(chain, name, venue, gas)
}

/// Verifies the coin count, then binds a [`CurveAdapter`] to `pool`.
///
/// # Errors
///
/// As [`check_token_count`], then any adapter construction error.
pub fn deploy_curve_adapter(
    chain: &mut Chain,
    name: &str,
    pool: Address,
    token_count: usize,
    gas: Gas,
) -> Result<CurveAdapter> {
    check_token_count(chain, pool, token_count)?;
    let venue = CurvePlainVenue::new(chain, pool, token_count)?;
    CurveAdapter::new(chain, name, venue, gas)
}

/// Verifies the coin count, then binds a [`CurveLendingAdapter`] to
/// `pool` and its lending `market`.
///
/// # Errors
///
/// As [`check_token_count`], then any adapter construction error.
pub fn deploy_curve_lending_adapter(
    chain: &mut Chain,
    name: &str,
    pool: Address,
    market: Address,
    token_count: usize,
    gas: Gas,
) -> Result<CurveLendingAdapter> {
    check_token_count(chain, pool, token_count)?;
    let venue = CurveLendingVenue::new(chain, pool, market, token_count)?;
    CurveLendingAdapter::new(chain, name, venue, gas)
}

/// Verifies the coin count, then binds a [`CryptoAdapter`] to `pool`.
///
/// # Errors
///
/// As [`check_token_count`], then any adapter construction error.
pub fn deploy_crypto_adapter(
    chain: &mut Chain,
    name: &str,
    pool: Address,
    token_count: usize,
    gas: Gas,
) -> Result<CryptoAdapter> {
    check_token_count(chain, pool, token_count)?;
    let venue = CryptoVenue::new(chain, pool, token_count)?;
    CryptoAdapter::new(chain, name, venue, gas)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Token;
    use crate::protocols::curve::CurvePool;
    use crate::protocols::lending::LendingMarket;
    use crate::protocols::saddle::SaddlePool;
    use crate::traits::Adapter;

    fn three_tokens(chain: &mut Chain) -> Vec<Token> {
        ["A", "B", "C"]
            .iter()
            .map(|s| {
                let Ok(t) = chain.create_token(s, 18) else {
                    panic!("token");
                };
                t
            })
            .collect()
    }

    #[test]
    fn exact_count_passes_and_neighbours_fail() {
        let mut chain = Chain::new();
        let tokens = three_tokens(&mut chain);
        let Ok(pool) = SaddlePool::deploy(&mut chain, &tokens, 100, 4_000_000) else {
            panic!("pool");
        };
        assert_eq!(check_token_count(&chain, pool, 3), Ok(()));
        for wrong in [0, 2, 4] {
            assert_eq!(
                check_token_count(&chain, pool, wrong),
                Err(AdapterError::TokenCountMismatch {
                    pool,
                    expected: wrong
                })
            );
        }
    }

    #[test]
    fn curve_pool_is_checked_through_coins() {
        let mut chain = Chain::new();
        let tokens = three_tokens(&mut chain);
        let Ok(pool) = CurvePool::deploy(&mut chain, &tokens[..2], 100, 4_000_000) else {
            panic!("pool");
        };
        assert_eq!(check_token_count(&chain, pool, 2), Ok(()));
        assert!(check_token_count(&chain, pool, 3).is_err());
    }

    #[test]
    fn non_indexed_contract_rejected() {
        let mut chain = Chain::new();
        let Ok(market) = LendingMarket::deploy(&mut chain) else {
            panic!("market");
        };
        assert_eq!(
            check_token_count(&chain, market, 2),
            Err(AdapterError::WrongContractKind {
                address: market,
                expected: "indexed pool"
            })
        );
    }

    #[test]
    fn deploy_refuses_wrong_count() {
        let mut chain = Chain::new();
        let tokens = three_tokens(&mut chain);
        let Ok(pool) = SaddlePool::deploy(&mut chain, &tokens, 100, 4_000_000) else {
            panic!("pool");
        };
        let result = deploy_saddle_adapter(&mut chain, "SaddleAdapter", pool, 2, Gas::new(140_000));
        assert!(matches!(result, Err(AdapterError::TokenCountMismatch { .. })));

        let Ok(adapter) = deploy_saddle_adapter(&mut chain, "SaddleAdapter", pool, 3, Gas::new(140_000))
        else {
            panic!("deploy");
        };
        assert!(adapter.is_pool_token(&chain, tokens[2].address()));
    }
}
