//! Concentrated-Liquidity Venue (Uniswap V3 style)
//!
//! Pools are keyed by (token0, token1, fee) and hold a single active
//! liquidity range. A quoter simulates exact-input swaps; the swap router
//! executes them and advances the pool price.
//!
//! Math (Uniswap SqrtPriceMath, within one range):
//!     - fee is in millionths (3000 = 0.30%) and is taken from the input
//!     - zeroForOne:  sqrtP' = ceil(L·Q96·sqrtP / (L·Q96 + in·sqrtP)),  out1 = L·(sqrtP − sqrtP') / Q96
//!     - oneForZero:  sqrtP' = sqrtP + in·Q96 / L,                       out0 = L·Q96/sqrtP − L·Q96/sqrtP'

use crate::chain::Chain;
use crate::error::{ArbError, ArbResult};
use crate::venues::pair::sort_tokens;
use alloy::primitives::{keccak256, Address, U256};
use std::collections::HashMap;
use tracing::debug;

/// Q96 = 2^96, used in sqrtPriceX96 math
const Q96: u128 = 1u128 << 96;

const FEE_DENOMINATOR: u32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcentratedPool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    /// Fee tier in millionths (500 = 0.05%, 3000 = 0.30%, 10000 = 1.00%)
    pub fee: u32,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
}

impl ConcentratedPool {
    /// Simulate an exact-input swap. Returns (amount_out, next_sqrt_price_x96),
    /// or None when the pool cannot fill it.
    pub fn simulate_exact_input(&self, token_in: Address, amount_in: U256) -> Option<(U256, U256)> {
        if amount_in.is_zero() || self.liquidity == 0 || self.sqrt_price_x96.is_zero() {
            return None;
        }
        let zero_for_one = if token_in == self.token0 {
            true
        } else if token_in == self.token1 {
            false
        } else {
            return None;
        };

        let amount_after_fee = amount_in
            .checked_mul(U256::from(FEE_DENOMINATOR.checked_sub(self.fee)?))?
            / U256::from(FEE_DENOMINATOR);
        if amount_after_fee.is_zero() {
            return None;
        }

        let liquidity = U256::from(self.liquidity);
        let (amount_out, next_sqrt_price) = if zero_for_one {
            let next = get_next_sqrt_price_from_amount0(self.sqrt_price_x96, self.liquidity, amount_after_fee)?;
            if next >= self.sqrt_price_x96 {
                return None;
            }
            let out = liquidity.checked_mul(self.sqrt_price_x96 - next)? / U256::from(Q96);
            (out, next)
        } else {
            let next = get_next_sqrt_price_from_amount1(self.sqrt_price_x96, self.liquidity, amount_after_fee)?;
            if next <= self.sqrt_price_x96 {
                return None;
            }
            let numerator: U256 = liquidity << 96usize;
            let out = (numerator / self.sqrt_price_x96).checked_sub(numerator / next)?;
            (out, next)
        };

        if amount_out.is_zero() {
            return None;
        }
        Some((amount_out, next_sqrt_price))
    }
}

/// getNextSqrtPriceFromAmount0RoundingUp
///
/// Precise formula first; falls back to ceil(L·Q96 / (L·Q96 / sqrtP + amount))
/// when L·Q96·sqrtP overflows.
fn get_next_sqrt_price_from_amount0(sqrt_price_x96: U256, liquidity: u128, amount: U256) -> Option<U256> {
    if amount.is_zero() {
        return Some(sqrt_price_x96);
    }
    if sqrt_price_x96.is_zero() {
        return None;
    }

    let numerator1: U256 = U256::from(liquidity) << 96usize;

    if let Some(product) = amount.checked_mul(sqrt_price_x96) {
        if let Some(denominator) = numerator1.checked_add(product) {
            if let Some(full_num) = numerator1.checked_mul(sqrt_price_x96) {
                let result = div_rounding_up(full_num, denominator)?;
                if !result.is_zero() {
                    return Some(result);
                }
            }
        }
    }

    let denominator = (numerator1 / sqrt_price_x96).checked_add(amount)?;
    if denominator.is_zero() {
        return None;
    }
    let result = div_rounding_up(numerator1, denominator)?;
    if result.is_zero() {
        return None;
    }
    Some(result)
}

fn div_rounding_up(numerator: U256, denominator: U256) -> Option<U256> {
    let quotient = numerator.checked_div(denominator)?;
    if (numerator % denominator).is_zero() {
        Some(quotient)
    } else {
        quotient.checked_add(U256::from(1))
    }
}

/// getNextSqrtPriceFromAmount1RoundingDown
fn get_next_sqrt_price_from_amount1(sqrt_price_x96: U256, liquidity: u128, amount: U256) -> Option<U256> {
    if amount.is_zero() {
        return Some(sqrt_price_x96);
    }
    let quotient = amount.checked_mul(U256::from(Q96))?.checked_div(U256::from(liquidity))?;
    sqrt_price_x96.checked_add(quotient)
}

#[derive(Debug, Clone, Default)]
pub struct PoolFactory {
    pub address: Address,
    pools: HashMap<(Address, Address, u32), ConcentratedPool>,
}

impl PoolFactory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pools: HashMap::new(),
        }
    }

    pub fn create_pool(
        &mut self,
        token_a: Address,
        token_b: Address,
        fee: u32,
        sqrt_price_x96: U256,
        liquidity: u128,
    ) -> ArbResult<Address> {
        if token_a == token_b {
            return Err(ArbError::Venue("UniswapV3: identical tokens".to_string()));
        }
        if fee >= FEE_DENOMINATOR {
            return Err(ArbError::Venue("UniswapV3: invalid fee".to_string()));
        }
        let (token0, token1) = sort_tokens(token_a, token_b);
        if self.pools.contains_key(&(token0, token1, fee)) {
            return Err(ArbError::Venue("UniswapV3: pool exists".to_string()));
        }

        let mut seed = Vec::with_capacity(63);
        seed.extend_from_slice(self.address.as_slice());
        seed.extend_from_slice(token0.as_slice());
        seed.extend_from_slice(token1.as_slice());
        seed.extend_from_slice(&fee.to_be_bytes()[1..]);
        let address = Address::from_slice(&keccak256(&seed)[12..]);

        self.pools.insert(
            (token0, token1, fee),
            ConcentratedPool {
                address,
                token0,
                token1,
                fee,
                sqrt_price_x96,
                liquidity,
            },
        );
        debug!("V3 pool created: {:?} ({:?}/{:?} fee={})", address, token0, token1, fee);
        Ok(address)
    }

    pub fn pool(&self, token_a: Address, token_b: Address, fee: u32) -> Option<&ConcentratedPool> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        self.pools.get(&(token0, token1, fee))
    }

    fn pool_mut(&mut self, token_a: Address, token_b: Address, fee: u32) -> Option<&mut ConcentratedPool> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        self.pools.get_mut(&(token0, token1, fee))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoter {
    pub address: Address,
    pub factory: Address,
}

impl Quoter {
    pub fn new(address: Address, factory: Address) -> Self {
        Self { address, factory }
    }

    /// Expected output of an exact-input single-pool swap. Fails like a reverting quoter.
    pub fn quote_exact_input_single(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> ArbResult<U256> {
        let factory = chain.pool_factory(self.factory)?;
        let pool = factory
            .pool(token_in, token_out, fee)
            .ok_or_else(|| ArbError::Venue("Quoter: pool not found".to_string()))?;
        let (amount_out, _) = pool
            .simulate_exact_input(token_in, amount_in)
            .ok_or_else(|| ArbError::Venue("Quoter: insufficient liquidity".to_string()))?;
        Ok(amount_out)
    }
}

/// Parameters of `exactInputSingle`. No sqrt price limit: the pool has one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRouter {
    pub address: Address,
    pub factory: Address,
}

impl SwapRouter {
    pub fn new(address: Address, factory: Address) -> Self {
        Self { address, factory }
    }

    /// Execute an exact-input single-pool swap, pulling `amount_in` from `caller`
    pub fn exact_input_single(&self, chain: &mut Chain, caller: Address, params: ExactInputSingleParams) -> ArbResult<U256> {
        if params.deadline < chain.timestamp() {
            return Err(ArbError::Venue("Transaction too old".to_string()));
        }

        let pool = chain
            .pool_factory(self.factory)?
            .pool(params.token_in, params.token_out, params.fee)
            .cloned()
            .ok_or_else(|| ArbError::Venue("SwapRouter: pool not initialized".to_string()))?;

        let (amount_out, next_sqrt_price) = pool
            .simulate_exact_input(params.token_in, params.amount_in)
            .ok_or_else(|| ArbError::Venue("SwapRouter: insufficient liquidity".to_string()))?;
        if amount_out < params.amount_out_minimum {
            return Err(ArbError::Venue("Too little received".to_string()));
        }

        let ledger = chain.ledger_mut();
        ledger.transfer_from(params.token_in, self.address, caller, pool.address, params.amount_in)?;
        ledger.transfer(params.token_out, pool.address, params.recipient, amount_out)?;

        if let Some(stored) = chain
            .pool_factory_mut(self.factory)?
            .pool_mut(params.token_in, params.token_out, params.fee)
        {
            stored.sqrt_price_x96 = next_sqrt_price;
        }

        debug!(
            "V3 swap via {:?}: {} {:?} -> {} {:?} (fee tier: {})",
            self.address, params.amount_in, params.token_in, amount_out, params.token_out, params.fee
        );
        Ok(amount_out)
    }
}
