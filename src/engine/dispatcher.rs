//! Swap Dispatcher
//!
//! Executes one hop against the venue's interface variant:
//! - PairStyle: factory pair-existence check, approve router, swapExactTokensForTokens
//! - QuoterStyle: quoter estimate at the configured fee tier, approve router, exactInputSingle
//!
//! The amount handed to the next hop is what actually arrived at the
//! recipient (balance delta), not the router's nominal return value.

use crate::chain::Chain;
use crate::error::{ArbError, ArbResult};
use crate::types::{ExchangeEntry, VenueKind};
use crate::venues::ExactInputSingleParams;
use alloy::primitives::{Address, U256};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapDispatcher {
    /// Account that pays the input and receives the output
    pub recipient: Address,
    pub fee_tier: u32,
    pub deadline_secs: u64,
}

impl SwapDispatcher {
    pub fn new(recipient: Address, fee_tier: u32, deadline_secs: u64) -> Self {
        Self {
            recipient,
            fee_tier,
            deadline_secs,
        }
    }

    /// Swap `amount_in` of `token_in` for `token_out` on `venue`.
    /// Returns the amount of `token_out` received.
    pub fn swap(
        &self,
        chain: &mut Chain,
        venue: &ExchangeEntry,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> ArbResult<U256> {
        let before = chain.ledger().balance_of(token_out, self.recipient);

        match venue.kind {
            VenueKind::PairStyle => self.swap_pair(chain, venue, token_in, token_out, amount_in)?,
            VenueKind::QuoterStyle => self.swap_quoter(chain, venue, token_in, token_out, amount_in)?,
        }

        let after = chain.ledger().balance_of(token_out, self.recipient);
        let received = after.checked_sub(before).ok_or(ArbError::Overflow)?;
        debug!("{} hop: {} {:?} -> {} {:?}", venue.name, amount_in, token_in, received, token_out);
        Ok(received)
    }

    fn deadline(&self, chain: &Chain) -> u64 {
        chain.timestamp().saturating_add(self.deadline_secs)
    }

    fn swap_pair(
        &self,
        chain: &mut Chain,
        venue: &ExchangeEntry,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> ArbResult<()> {
        let factory = chain.pair_factory(venue.secondary)?;
        if factory.get_pair(token_in, token_out) == Address::ZERO {
            return Err(ArbError::PoolNotFound { token_in, token_out });
        }

        chain.ledger_mut().approve(token_in, self.recipient, venue.primary, amount_in);
        let router = chain.pair_router(venue.primary)?;
        let deadline = self.deadline(chain);

        // No output floor: the profitability gate covers the whole cycle
        router.swap_exact_tokens_for_tokens(
            chain,
            self.recipient,
            amount_in,
            U256::ZERO,
            &[token_in, token_out],
            self.recipient,
            deadline,
        )?;
        Ok(())
    }

    fn swap_quoter(
        &self,
        chain: &mut Chain,
        venue: &ExchangeEntry,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> ArbResult<()> {
        // A reverting or empty quote means there is no usable pool
        let quoted = self
            .quote(chain, venue, token_in, token_out, amount_in)
            .map_err(|_| ArbError::PoolNotFound { token_in, token_out })?;
        if quoted.is_zero() {
            return Err(ArbError::PoolNotFound { token_in, token_out });
        }
        debug!("{} quote: {} -> {} (fee tier: {})", venue.name, amount_in, quoted, self.fee_tier);

        chain.ledger_mut().approve(token_in, self.recipient, venue.primary, amount_in);
        let router = chain.swap_router(venue.primary)?;
        let params = ExactInputSingleParams {
            token_in,
            token_out,
            fee: self.fee_tier,
            recipient: self.recipient,
            deadline: self.deadline(chain),
            amount_in,
            amount_out_minimum: U256::ZERO,
        };
        router.exact_input_single(chain, self.recipient, params)?;
        Ok(())
    }

    fn quote(
        &self,
        chain: &Chain,
        venue: &ExchangeEntry,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> ArbResult<U256> {
        let quoter = chain.quoter(venue.secondary)?;
        quoter.quote_exact_input_single(chain, token_in, token_out, self.fee_tier, amount_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, ENGINE, SUSHISWAP, UNISWAP_V2, UNISWAP_V3, BAT, USDC, WETH};
    use crate::types::DEFAULT_QUOTER_FEE_TIER;

    fn dispatcher() -> SwapDispatcher {
        SwapDispatcher::new(ENGINE, DEFAULT_QUOTER_FEE_TIER, 300)
    }

    #[test]
    fn test_pair_hop_returns_balance_delta() {
        let mut world = testing::world();
        world.chain.ledger_mut().mint(USDC, ENGINE, testing::usdc(10_000)).unwrap();
        let venue = world.engine.registry().entry(UNISWAP_V2).unwrap().clone();

        let out = dispatcher()
            .swap(&mut world.chain, &venue, USDC, WETH, testing::usdc(10_000))
            .unwrap();

        assert!(out > U256::ZERO);
        assert_eq!(world.chain.ledger().balance_of(WETH, ENGINE), out);
        assert_eq!(world.chain.ledger().balance_of(USDC, ENGINE), U256::ZERO);
    }

    #[test]
    fn test_quoter_hop_moves_tokens() {
        let mut world = testing::world();
        world.chain.ledger_mut().mint(WETH, ENGINE, testing::weth(1)).unwrap();
        let venue = world.engine.registry().entry(UNISWAP_V3).unwrap().clone();

        let out = dispatcher()
            .swap(&mut world.chain, &venue, WETH, USDC, testing::weth(1))
            .unwrap();

        // ~2200 USDC minus the 0.30% fee and price impact
        assert!(out > testing::usdc(2_150) && out < testing::usdc(2_200));
        assert_eq!(world.chain.ledger().balance_of(USDC, ENGINE), out);
    }

    #[test]
    fn test_missing_pair_is_pool_not_found() {
        let mut world = testing::world();
        world.chain.ledger_mut().mint(USDC, ENGINE, testing::usdc(1)).unwrap();
        let venue = world.engine.registry().entry(SUSHISWAP).unwrap().clone();

        let err = dispatcher()
            .swap(&mut world.chain, &venue, USDC, BAT, testing::usdc(1))
            .unwrap_err();
        assert_eq!(err, ArbError::PoolNotFound { token_in: USDC, token_out: BAT });
    }

    #[test]
    fn test_missing_quoter_pool_is_pool_not_found() {
        let mut world = testing::world();
        world.chain.ledger_mut().mint(USDC, ENGINE, testing::usdc(1)).unwrap();
        let venue = world.engine.registry().entry(UNISWAP_V3).unwrap().clone();

        let err = dispatcher()
            .swap(&mut world.chain, &venue, USDC, BAT, testing::usdc(1))
            .unwrap_err();
        assert_eq!(err.reason(), "Pool does not exist");
    }

    #[test]
    fn test_wrong_fee_tier_finds_no_pool() {
        let mut world = testing::world();
        world.chain.ledger_mut().mint(WETH, ENGINE, testing::weth(1)).unwrap();
        let venue = world.engine.registry().entry(UNISWAP_V3).unwrap().clone();

        let err = SwapDispatcher::new(ENGINE, 500, 300)
            .swap(&mut world.chain, &venue, WETH, USDC, testing::weth(1))
            .unwrap_err();
        assert!(matches!(err, ArbError::PoolNotFound { .. }));
    }
}
