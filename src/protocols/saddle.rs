//! Saddle-style StableSwap pool.
//!
//! Coins are addressed by `uint8` index through `get_token`, which fails
//! past the last coin; there is no coin-count getter.  Settlement is
//! exact: `swap` pays precisely what `calculate_swap` reports.

use alloy_primitives::Address;
use tracing::debug;

use super::stableswap::{StableSwapCore, FEE_DENOMINATOR};
use super::CoinList;
use crate::domain::{Amount, Token};
use crate::error::{AdapterError, Result};
use crate::host::{Chain, Ledger};

/// A StableSwap pool with `uint8` token indices.
#[derive(Debug, Clone)]
pub struct SaddlePool {
    address: Address,
    core: StableSwapCore,
    swap_fee: u64,
    paused: bool,
}

impl SaddlePool {
    /// Creates a pool over `tokens` with amplification `amp` and a swap fee
    /// in 1e10 units.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidConfiguration`] for more than 255
    /// coins, a fee of 100% or more, or any invalid core parameter.
    pub fn new(address: Address, tokens: &[Token], amp: u64, swap_fee: u64) -> Result<Self> {
        if tokens.len() > usize::from(u8::MAX) {
            return Err(AdapterError::InvalidConfiguration(
                "uint8 indices allow at most 255 coins",
            ));
        }
        if swap_fee >= FEE_DENOMINATOR {
            return Err(AdapterError::InvalidConfiguration("fee must be below 100%"));
        }
        Ok(Self {
            address,
            core: StableSwapCore::new(tokens, amp)?,
            swap_fee,
            paused: false,
        })
    }

    /// Deploys a pool on `chain`.
    ///
    /// # Errors
    ///
    /// Same as [`SaddlePool::new`].
    pub fn deploy(chain: &mut Chain, tokens: &[Token], amp: u64, swap_fee: u64) -> Result<Address> {
        chain.deploy(|address, _| Self::new(address, tokens, amp, swap_fee))
    }

    /// Own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Token at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] past the last coin.
    pub fn get_token(&self, index: u8) -> Result<Address> {
        self.core.coin(usize::from(index))
    }

    /// Index of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] if `token` is not a coin.
    pub fn get_token_index(&self, token: Address) -> Result<u8> {
        self.core
            .index_of(token)
            .and_then(|i| u8::try_from(i).ok())
            .ok_or(AdapterError::TokenIndexOutOfRange)
    }

    /// Pool balance of the token at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::TokenIndexOutOfRange`] past the last coin.
    pub fn get_token_balance(&self, index: u8) -> Result<Amount> {
        self.core.balance(usize::from(index))
    }

    /// Swap fee in 1e10 units.
    #[must_use]
    pub const fn swap_fee(&self) -> u64 {
        self.swap_fee
    }

    /// Returns `true` while swaps are halted.
    #[must_use]
    pub const fn paused(&self) -> bool {
        self.paused
    }

    /// Halts or resumes swaps.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Output for swapping `dx` of token `from` into token `to`.
    ///
    /// # Errors
    ///
    /// Returns index, liquidity and solver errors.
    pub fn calculate_swap(&self, ledger: &Ledger, from: u8, to: u8, dx: Amount) -> Result<Amount> {
        let (i, j) = (usize::from(from), usize::from(to));
        if dx.is_zero() {
            self.core.coin(i)?;
            self.core.coin(j)?;
            return Ok(Amount::ZERO);
        }
        let raw = self.core.price(ledger, i, j, dx)?;
        self.core.to_raw_after_fee(j, raw.dy_xp, self.swap_fee)
    }

    /// Swaps `dx` of token `from` held by `caller` into token `to`, paid to
    /// `caller`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::SwapsDisabled`] while paused.
    /// - [`AdapterError::DeadlineExpired`] if `deadline` is in the past.
    /// - [`AdapterError::InsufficientOutput`] below `min_dy`.
    /// - Ledger errors if `caller` lacks `dx`.
    pub fn swap(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        (from, to): (u8, u8),
        dx: Amount,
        min_dy: Amount,
        deadline: u64,
    ) -> Result<Amount> {
        if self.paused {
            return Err(AdapterError::SwapsDisabled("pool paused"));
        }
        if deadline < ledger.timestamp() {
            return Err(AdapterError::DeadlineExpired);
        }
        if dx.is_zero() {
            return Err(AdapterError::InvalidAmount("cannot swap zero"));
        }
        let dy = self.calculate_swap(ledger, from, to, dx)?;
        if dy < min_dy {
            return Err(AdapterError::InsufficientOutput {
                amount_out: dy,
                min_out: min_dy,
            });
        }
        let pool = self.address;
        self.core.settle(
            ledger,
            pool,
            caller,
            (usize::from(from), dx),
            (usize::from(to), dy),
        )?;
        debug!(%pool, from, to, %dx, %dy, "saddle swap");
        Ok(dy)
    }

    /// Deposits one amount per coin from `provider`.
    ///
    /// # Errors
    ///
    /// See [`StableSwapCore::add_liquidity`].
    pub fn add_liquidity(
        &mut self,
        ledger: &mut Ledger,
        provider: Address,
        amounts: &[Amount],
    ) -> Result<()> {
        let pool = self.address;
        self.core.add_liquidity(ledger, pool, provider, amounts)
    }
}

impl CoinList for SaddlePool {
    fn coin_at(&self, index: usize) -> Result<Address> {
        let index = u8::try_from(index).map_err(|_| AdapterError::TokenIndexOutOfRange)?;
        self.get_token(index)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    struct Setup {
        chain: Chain,
        pool: Address,
        trader: Address,
        tokens: Vec<Token>,
    }

    fn setup() -> Setup {
        let mut chain = Chain::new();
        let mut tokens = Vec::new();
        for (sym, dec) in [("WBTC.e", 8u8), ("renBTC", 8), ("BTCb", 8)] {
            let Ok(t) = chain.create_token(sym, dec) else {
                panic!("token");
            };
            tokens.push(t);
        }
        let Ok(pool) = SaddlePool::deploy(&mut chain, &tokens, 100, 4_000_000) else {
            panic!("pool");
        };
        let lp = chain.create_account();
        let amounts: Vec<Amount> = tokens.iter().map(|t| Amount::new(t.parse_units(500))).collect();
        for (t, a) in tokens.iter().zip(&amounts) {
            let Ok(()) = chain.ledger_mut().mint(t.address(), lp, *a) else {
                panic!("mint");
            };
        }
        let Ok(()) = chain.call_mut::<SaddlePool, _, _>(pool, |p, l| p.add_liquidity(l, lp, &amounts))
        else {
            panic!("liquidity");
        };
        let trader = chain.create_account();
        Setup {
            chain,
            pool,
            trader,
            tokens,
        }
    }

    #[test]
    fn get_token_fails_past_last_coin() {
        let s = setup();
        let Ok(pool) = s.chain.contract::<SaddlePool>(s.pool) else {
            panic!("pool");
        };
        assert_eq!(pool.get_token(2), Ok(s.tokens[2].address()));
        assert_eq!(pool.get_token(3), Err(AdapterError::TokenIndexOutOfRange));
        assert_eq!(pool.coin_at(256), Err(AdapterError::TokenIndexOutOfRange));
        assert_eq!(pool.get_token_index(s.tokens[1].address()), Ok(1));
    }

    #[test]
    fn swap_pays_exactly_calculate_swap() {
        let mut s = setup();
        let dx = Amount::new(s.tokens[0].parse_units(3));
        let Ok(()) = s.chain.ledger_mut().mint(s.tokens[0].address(), s.trader, dx) else {
            panic!("mint");
        };
        let Ok(quoted) = s
            .chain
            .call::<SaddlePool, _, _>(s.pool, |p, l| p.calculate_swap(l, 0, 2, dx))
        else {
            panic!("quote");
        };
        let trader = s.trader;
        let deadline = s.chain.ledger().timestamp();
        let Ok(paid) = s.chain.call_mut::<SaddlePool, _, _>(s.pool, |p, l| {
            p.swap(l, trader, (0, 2), dx, Amount::ZERO, deadline)
        }) else {
            panic!("swap");
        };
        assert_eq!(paid, quoted);
        assert_eq!(
            s.chain.ledger().inspect_balance(s.tokens[2].address(), trader),
            quoted
        );
        assert_eq!(
            s.chain.ledger().inspect_balance(s.tokens[0].address(), trader),
            Amount::ZERO
        );
    }

    #[test]
    fn paused_pool_rejects_swaps() {
        let mut s = setup();
        let Ok(()) = s.chain.call_mut::<SaddlePool, _, _>(s.pool, |p, _| {
            p.set_paused(true);
            Ok(())
        }) else {
            panic!("pause");
        };
        let trader = s.trader;
        let result = s.chain.call_mut::<SaddlePool, _, _>(s.pool, |p, l| {
            p.swap(l, trader, (0, 1), Amount::new(1_000), Amount::ZERO, 0)
        });
        assert_eq!(result, Err(AdapterError::SwapsDisabled("pool paused")));
    }

    #[test]
    fn expired_deadline_rejected() {
        let mut s = setup();
        s.chain.ledger_mut().advance_time(60);
        let trader = s.trader;
        let result = s.chain.call_mut::<SaddlePool, _, _>(s.pool, |p, l| {
            p.swap(l, trader, (0, 1), Amount::new(1_000), Amount::ZERO, 59)
        });
        assert_eq!(result, Err(AdapterError::DeadlineExpired));
    }
}
