//! Constant-Product Venue (Uniswap V2 style)
//!
//! A factory that records one pair per token pair and a router that swaps
//! exact input along a path of pairs. Pair reserves are the pair's own
//! ledger balances.
//!
//! Formula: amount_out = (amount_in * 997 * reserve_out) / (reserve_in * 1000 + amount_in * 997)

use crate::chain::Chain;
use crate::error::{ArbError, ArbResult};
use alloy::primitives::{keccak256, Address, U256};
use std::collections::HashMap;
use tracing::debug;

/// V2 fee factor: 997/1000 = 0.30% fee
const FEE_NUMERATOR: u64 = 997;
const FEE_DENOMINATOR: u64 = 1000;

/// Output amount for an exact input against the given reserves.
/// Returns None on empty input, empty reserves or overflow.
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }

    let amount_in_with_fee = amount_in.checked_mul(U256::from(FEE_NUMERATOR))?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR))?
        .checked_add(amount_in_with_fee)?;

    Some(numerator / denominator)
}

/// Order two tokens the way pairs store them (lower address first)
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
}

#[derive(Debug, Clone, Default)]
pub struct PairFactory {
    pub address: Address,
    pairs: HashMap<(Address, Address), Pair>,
}

impl PairFactory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pairs: HashMap::new(),
        }
    }

    /// Register a pair for (token_a, token_b). Pair address is the last
    /// 20 bytes of keccak256(factory ‖ token0 ‖ token1).
    pub fn create_pair(&mut self, token_a: Address, token_b: Address) -> ArbResult<Address> {
        if token_a == token_b {
            return Err(ArbError::Venue("UniswapV2: IDENTICAL_ADDRESSES".to_string()));
        }
        let (token0, token1) = sort_tokens(token_a, token_b);
        if token0 == Address::ZERO {
            return Err(ArbError::Venue("UniswapV2: ZERO_ADDRESS".to_string()));
        }
        if self.pairs.contains_key(&(token0, token1)) {
            return Err(ArbError::Venue("UniswapV2: PAIR_EXISTS".to_string()));
        }

        let mut seed = Vec::with_capacity(60);
        seed.extend_from_slice(self.address.as_slice());
        seed.extend_from_slice(token0.as_slice());
        seed.extend_from_slice(token1.as_slice());
        let address = Address::from_slice(&keccak256(&seed)[12..]);

        self.pairs.insert((token0, token1), Pair { address, token0, token1 });
        debug!("Pair created: {:?} ({:?}/{:?})", address, token0, token1);
        Ok(address)
    }

    /// Pair address, or the zero address when no pair exists
    pub fn get_pair(&self, token_a: Address, token_b: Address) -> Address {
        self.pair(token_a, token_b)
            .map(|p| p.address)
            .unwrap_or(Address::ZERO)
    }

    pub fn pair(&self, token_a: Address, token_b: Address) -> Option<Pair> {
        self.pairs.get(&sort_tokens(token_a, token_b)).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRouter {
    pub address: Address,
    pub factory: Address,
}

impl PairRouter {
    pub fn new(address: Address, factory: Address) -> Self {
        Self { address, factory }
    }

    /// Amounts along `path` for an exact input; `amounts[0] == amount_in`
    pub fn get_amounts_out(&self, chain: &Chain, amount_in: U256, path: &[Address]) -> ArbResult<Vec<U256>> {
        if path.len() < 2 {
            return Err(ArbError::Venue("UniswapV2Library: INVALID_PATH".to_string()));
        }
        let factory = chain.pair_factory(self.factory)?;

        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        for window in path.windows(2) {
            let (token_in, token_out) = (window[0], window[1]);
            let pair = factory
                .pair(token_in, token_out)
                .ok_or_else(|| ArbError::Venue("UniswapV2Library: PAIR_NOT_FOUND".to_string()))?;
            let reserve_in = chain.ledger().balance_of(token_in, pair.address);
            let reserve_out = chain.ledger().balance_of(token_out, pair.address);
            let last = amounts[amounts.len() - 1];
            let out = get_amount_out(last, reserve_in, reserve_out)
                .ok_or_else(|| ArbError::Venue("UniswapV2Library: INSUFFICIENT_LIQUIDITY".to_string()))?;
            amounts.push(out);
        }
        Ok(amounts)
    }

    /// Swap an exact `amount_in` of `path[0]` for as much of the last token as possible.
    /// The router pulls `amount_in` from `caller` using the caller's allowance.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_tokens(
        &self,
        chain: &mut Chain,
        caller: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> ArbResult<Vec<U256>> {
        if deadline < chain.timestamp() {
            return Err(ArbError::Venue("UniswapV2Router: EXPIRED".to_string()));
        }

        let amounts = self.get_amounts_out(chain, amount_in, path)?;
        let amount_out = amounts[amounts.len() - 1];
        if amount_out < amount_out_min {
            return Err(ArbError::Venue("UniswapV2Router: INSUFFICIENT_OUTPUT_AMOUNT".to_string()));
        }

        let factory = chain.pair_factory(self.factory)?;
        let pairs: Vec<Pair> = path
            .windows(2)
            .filter_map(|w| factory.pair(w[0], w[1]))
            .collect();

        chain
            .ledger_mut()
            .transfer_from(path[0], self.address, caller, pairs[0].address, amount_in)?;

        for (i, pair) in pairs.iter().enumerate() {
            let recipient = pairs.get(i + 1).map(|next| next.address).unwrap_or(to);
            chain
                .ledger_mut()
                .transfer(path[i + 1], pair.address, recipient, amounts[i + 1])?;
        }

        debug!(
            "V2 swap via {:?}: {} {:?} -> {} {:?}",
            self.address, amount_in, path[0], amount_out, path[path.len() - 1]
        );
        Ok(amounts)
    }
}
