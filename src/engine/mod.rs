//! Flash Swap Engine
//!
//! Borrows a token from a flash loan provider, runs it through a cyclic
//! multi-venue route, checks that the cycle covers principal plus fee,
//! repays, and keeps the residual as profit.
//!
//! Flow (both providers):
//!     execute_* → validate route → provider.flash_loan → provider calls back
//!     → identity check → validate decoded route → hops → profit gate → repay
//!
//! Every execution runs inside `Chain::transact`, so any failure leaves the
//! world exactly as it was before the call.
//!
//! Created: 2026-10-16

pub mod callbacks;
pub mod dispatcher;
pub mod validator;

pub use dispatcher::SwapDispatcher;

use crate::chain::Chain;
use crate::contracts::{FlashSwapExecuted, HopExecuted};
use crate::error::{ArbError, ArbResult};
use crate::events::EngineEvent;
use crate::registry::ExchangeRegistry;
use crate::types::{
    ArbitrageRoute, ExchangeInfo, ExecutionReport, HopReport, LoanContext, ProviderId, VenueKind,
    DEFAULT_DEADLINE_SECS, DEFAULT_QUOTER_FEE_TIER,
};
use alloy::primitives::{keccak256, Address, B256, U256};
use tracing::{debug, info};

/// Identifies one Balancer loan request: keccak256(token ‖ amount ‖ userData)
pub(crate) fn flash_loan_key(token: Address, amount: U256, user_data: &[u8]) -> B256 {
    let mut seed = Vec::with_capacity(20 + 32 + user_data.len());
    seed.extend_from_slice(token.as_slice());
    seed.extend_from_slice(&amount.to_be_bytes::<32>());
    seed.extend_from_slice(user_data);
    keccak256(&seed)
}

/// Addresses and knobs fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// The engine's own address (holds balances, receives loans)
    pub address: Address,
    pub owner: Address,
    pub balancer_vault: Address,
    pub aave_pool: Address,
    /// Fee tier used for QuoterStyle venues (millionths)
    pub quoter_fee_tier: u32,
    /// Swap deadline offset from the block timestamp
    pub deadline_secs: u64,
}

impl EngineConfig {
    pub fn new(address: Address, owner: Address, balancer_vault: Address, aave_pool: Address) -> Self {
        Self {
            address,
            owner,
            balancer_vault,
            aave_pool,
            quoter_fee_tier: DEFAULT_QUOTER_FEE_TIER,
            deadline_secs: DEFAULT_DEADLINE_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlashSwapEngine {
    config: EngineConfig,
    registry: ExchangeRegistry,
}

impl FlashSwapEngine {
    pub fn new(config: EngineConfig) -> Self {
        info!(
            "FlashSwapEngine at {:?} (owner {:?}, vault {:?}, pool {:?})",
            config.address, config.owner, config.balancer_vault, config.aave_pool
        );
        Self {
            registry: ExchangeRegistry::new(config.owner),
            config,
        }
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExchangeRegistry {
        &self.registry
    }

    pub(crate) fn only_owner(&self, caller: Address) -> ArbResult<()> {
        if caller != self.config.owner {
            return Err(ArbError::NotOwner(caller));
        }
        Ok(())
    }

    // ── Admin surface ───────────────────────────────────────────────────

    pub fn add_exchange_router(
        &mut self,
        caller: Address,
        name: &str,
        router: Address,
        aux: Address,
        kind: VenueKind,
    ) -> ArbResult<()> {
        self.registry.add(caller, name, router, aux, kind)
    }

    pub fn remove_exchange_router(&mut self, caller: Address, name: &str) -> ArbResult<()> {
        self.registry.remove(caller, name).map(|_| ())
    }

    pub fn get_exchanges(&self) -> Vec<String> {
        self.registry.list()
    }

    pub fn exchanges_info(&self, name: &str) -> ExchangeInfo {
        self.registry.info(name)
    }

    // ── Execution surface ───────────────────────────────────────────────

    /// Run `exchange_names`/`tokens` as a Balancer-funded cycle borrowing `amount` of `tokens[0]`
    pub fn execute_flash_swap(
        &self,
        chain: &mut Chain,
        exchange_names: Vec<String>,
        tokens: Vec<Address>,
        amount: U256,
    ) -> ArbResult<ExecutionReport> {
        let route = ArbitrageRoute::new(exchange_names, tokens);
        chain.transact(|chain| {
            let first_log = chain.logs().len();
            validator::validate_route(&self.registry, &route, amount)?;
            let token = route.tokens[0];

            let vault = chain.balancer_vault(self.config.balancer_vault)?;
            let user_data = route.encode();
            // The vault reports no initiator, so the callback checks this marker instead
            chain.open_flash_loan(self.config.address, flash_loan_key(token, amount, &user_data));
            info!("Requesting Balancer flash loan: {} of {:?}", amount, token);
            vault.flash_loan(chain, self.config.address, self, &[token], &[amount], &user_data)?;

            self.report_since(chain, first_log)
        })
    }

    /// Same as `execute_flash_swap`, funded by the Aave pool
    pub fn execute_flash_swap_aave(
        &self,
        chain: &mut Chain,
        exchange_names: Vec<String>,
        tokens: Vec<Address>,
        amount: U256,
    ) -> ArbResult<ExecutionReport> {
        let route = ArbitrageRoute::new(exchange_names, tokens);
        chain.transact(|chain| {
            let first_log = chain.logs().len();
            validator::validate_route(&self.registry, &route, amount)?;
            let token = route.tokens[0];

            let pool = chain.aave_pool(self.config.aave_pool)?;
            info!("Requesting Aave flash loan: {} of {:?}", amount, token);
            pool.flash_loan_simple(
                chain,
                self.config.address,
                self.config.address,
                self,
                token,
                amount,
                &route.encode(),
            )?;

            self.report_since(chain, first_log)
        })
    }

    pub fn execute(
        &self,
        chain: &mut Chain,
        provider: ProviderId,
        exchange_names: Vec<String>,
        tokens: Vec<Address>,
        amount: U256,
    ) -> ArbResult<ExecutionReport> {
        match provider {
            ProviderId::Balancer => self.execute_flash_swap(chain, exchange_names, tokens, amount),
            ProviderId::Aave => self.execute_flash_swap_aave(chain, exchange_names, tokens, amount),
        }
    }

    /// Shared body of both callbacks: hops, profit gate, events.
    /// Returns the amount owed to the provider.
    pub(crate) fn run_route(&self, chain: &mut Chain, route: &ArbitrageRoute, loan: LoanContext) -> ArbResult<U256> {
        let venues = validator::validate_route(&self.registry, route, loan.borrowed_amount)?;
        if route.start_token() != Some(loan.borrowed_token) {
            return Err(ArbError::InvalidCallbackParams);
        }

        let dispatcher = SwapDispatcher::new(self.config.address, self.config.quoter_fee_tier, self.config.deadline_secs);
        let mut amount = loan.borrowed_amount;
        for (hop, venue) in route.hops().into_iter().zip(venues) {
            let amount_out = dispatcher.swap(chain, venue, hop.token_in, hop.token_out, amount)?;
            chain.emit(
                self.config.address,
                EngineEvent::HopExecuted(HopExecuted {
                    exchange: hop.venue.to_string(),
                    tokenIn: hop.token_in,
                    tokenOut: hop.token_out,
                    amountIn: amount,
                    amountOut: amount_out,
                }),
            );
            amount = amount_out;
        }

        let repayment = loan.repayment()?;
        if amount < repayment {
            debug!("Cycle returned {} < required {}", amount, repayment);
            return Err(ArbError::Unprofitable {
                final_amount: amount,
                required: repayment,
            });
        }
        let profit = amount - repayment;

        chain.emit(
            self.config.address,
            EngineEvent::FlashSwapExecuted(FlashSwapExecuted {
                provider: loan.provider.to_string(),
                token: loan.borrowed_token,
                amount: loan.borrowed_amount,
                fee: loan.fee,
                finalAmount: amount,
                profit,
            }),
        );
        info!(
            "Flash swap via {}: borrowed {} fee {} final {} profit {}",
            loan.provider, loan.borrowed_amount, loan.fee, amount, profit
        );
        Ok(repayment)
    }

    /// Assemble the report from this engine's events logged since `first_log`
    fn report_since(&self, chain: &Chain, first_log: usize) -> ArbResult<ExecutionReport> {
        let mut hops = Vec::new();
        let mut summary = None;

        for log in chain.logs()[first_log..].iter().filter(|l| l.emitter == self.config.address) {
            match &log.event {
                EngineEvent::HopExecuted(e) => hops.push(HopReport {
                    exchange: e.exchange.clone(),
                    token_in: e.tokenIn,
                    token_out: e.tokenOut,
                    amount_in: e.amountIn,
                    amount_out: e.amountOut,
                }),
                EngineEvent::FlashSwapExecuted(e) => summary = Some(e.clone()),
                _ => {}
            }
        }

        let summary = summary.ok_or_else(|| ArbError::Provider("Flash loan callback not invoked".to_string()))?;
        let provider = summary
            .provider
            .parse::<ProviderId>()
            .map_err(ArbError::Provider)?;

        Ok(ExecutionReport {
            provider,
            borrowed_token: summary.token,
            borrowed_amount: summary.amount,
            fee: summary.fee,
            final_amount: summary.finalAmount,
            profit: summary.profit,
            hops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, AAVE_POOL, BAT, ENGINE, OWNER, SUSHISWAP, UNISWAP_V2, UNISWAP_V3, USDC, VAULT, WETH};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_profitable_pair_to_pair_balancer() {
        let mut world = testing::world();
        let amount = testing::usdc(10_000);
        let vault_before = world.chain.ledger().balance_of(USDC, VAULT);

        let report = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, WETH], amount)
            .unwrap();

        assert_eq!(report.provider, ProviderId::Balancer);
        assert_eq!(report.fee, U256::ZERO);
        assert_eq!(report.hops.len(), 2);
        assert_eq!(report.hops[0].amount_in, amount);
        assert_eq!(report.hops[1].amount_in, report.hops[0].amount_out);
        assert_eq!(report.final_amount, report.hops[1].amount_out);
        assert_eq!(report.profit, report.final_amount - amount);
        // Roughly 10% spread minus two 0.30% fees and price impact
        assert!(report.profit > testing::usdc(700));

        assert_eq!(world.chain.ledger().balance_of(USDC, ENGINE), report.profit);
        assert_eq!(world.chain.ledger().balance_of(USDC, VAULT), vault_before);
        assert_eq!(world.chain.ledger().balance_of(WETH, ENGINE), U256::ZERO);
    }

    #[test]
    fn test_balancer_fee_comes_out_of_residual() {
        let mut world = testing::world_with_vault_fee(1);
        let amount = testing::usdc(10_000);
        let vault_before = world.chain.ledger().balance_of(USDC, VAULT);

        let report = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, WETH], amount)
            .unwrap();

        // 1 bps of 10_000 USDC
        assert_eq!(report.fee, testing::usdc(1));
        assert_eq!(report.profit, report.final_amount - amount - report.fee);
        assert_eq!(world.chain.ledger().balance_of(USDC, ENGINE), report.profit);
        assert_eq!(world.chain.ledger().balance_of(USDC, VAULT), vault_before + report.fee);
    }

    #[test]
    fn test_profitable_pair_to_quoter_aave() {
        let mut world = testing::world();
        let amount = testing::usdc(10_000);
        let pool_before = world.chain.ledger().balance_of(USDC, AAVE_POOL);

        let report = world
            .engine
            .execute_flash_swap_aave(&mut world.chain, names(&[UNISWAP_V2, UNISWAP_V3]), vec![USDC, WETH], amount)
            .unwrap();

        // 5 bps of 10_000 USDC
        assert_eq!(report.fee, testing::usdc(5));
        assert_eq!(report.provider, ProviderId::Aave);
        assert_eq!(report.final_amount, amount + report.fee + report.profit);
        assert_eq!(world.chain.ledger().balance_of(USDC, ENGINE), report.profit);
        assert_eq!(world.chain.ledger().balance_of(USDC, AAVE_POOL), pool_before + report.fee);
        assert_eq!(world.chain.ledger().allowance(USDC, ENGINE, AAVE_POOL), U256::ZERO);
    }

    #[test]
    fn test_profitable_three_hop_cycle() {
        let mut world = testing::world();
        let amount = testing::usdc(10_000);
        let report = world
            .engine
            .execute_flash_swap(
                &mut world.chain,
                names(&[UNISWAP_V2, SUSHISWAP, UNISWAP_V2]),
                vec![USDC, WETH, BAT],
                amount,
            )
            .unwrap();

        let path: Vec<(Address, Address)> = report.hops.iter().map(|h| (h.token_in, h.token_out)).collect();
        assert_eq!(path, vec![(USDC, WETH), (WETH, BAT), (BAT, USDC)]);
        assert!(report.profit > U256::ZERO);
        assert_eq!(world.chain.ledger().balance_of(BAT, ENGINE), U256::ZERO);
    }

    #[test]
    fn test_closing_hop_without_pool_fails() {
        let mut world = testing::world();
        let err = world
            .engine
            .execute_flash_swap(
                &mut world.chain,
                names(&[UNISWAP_V2, SUSHISWAP, SUSHISWAP]),
                vec![USDC, WETH, BAT],
                testing::usdc(10_000),
            )
            .unwrap_err();
        assert_eq!(err, ArbError::PoolNotFound { token_in: BAT, token_out: USDC });
    }

    #[test]
    fn test_unprofitable_reverse_route_rolls_back() {
        let mut world = testing::world();
        let ledger_before = world.chain.ledger().clone();
        let logs_before = world.chain.logs().len();

        let err = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[SUSHISWAP, UNISWAP_V2]), vec![USDC, WETH], testing::usdc(10_000))
            .unwrap_err();

        assert!(matches!(err, ArbError::Unprofitable { .. }));
        assert_eq!(err.reason(), "Arbitrage not profitable");
        assert_eq!(world.chain.ledger(), &ledger_before);
        assert_eq!(world.chain.logs().len(), logs_before);
    }

    #[test]
    fn test_unprofitable_quoter_to_pair_aave() {
        let mut world = testing::world();
        let ledger_before = world.chain.ledger().clone();

        let err = world
            .engine
            .execute_flash_swap_aave(&mut world.chain, names(&[UNISWAP_V3, UNISWAP_V2]), vec![USDC, WETH], testing::usdc(10_000))
            .unwrap_err();

        assert!(matches!(err, ArbError::Unprofitable { .. }));
        assert_eq!(world.chain.ledger(), &ledger_before);
    }

    #[test]
    fn test_route_shape_errors_before_loan() {
        let mut world = testing::world();
        let engine = &world.engine;
        let chain = &mut world.chain;
        let amt = testing::usdc(1);

        let err = engine.execute_flash_swap(chain, names(&["X"]), vec![USDC, WETH], amt).unwrap_err();
        assert_eq!(err.reason(), "Invalid exchange names length");

        let err = engine.execute_flash_swap(chain, names(&["X", "Y"]), vec![USDC], amt).unwrap_err();
        assert_eq!(err.reason(), "Invalid tokens address length");

        let err = engine
            .execute_flash_swap(chain, names(&["X", "Y", "Z"]), vec![USDC, WETH], amt)
            .unwrap_err();
        assert_eq!(err, ArbError::LengthMismatch);

        let err = engine
            .execute_flash_swap_aave(chain, names(&["X", "Y"]), vec![USDC, WETH], U256::ZERO)
            .unwrap_err();
        assert_eq!(err, ArbError::InvalidAmount);

        assert!(chain.logs().is_empty());
    }

    #[test]
    fn test_unregistered_venue_rejected() {
        let mut world = testing::world();
        let err = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, "CURVE"]), vec![USDC, WETH], testing::usdc(1))
            .unwrap_err();
        assert_eq!(err.reason(), "Exchange not registered");
    }

    #[test]
    fn test_missing_pool_rejected_and_rolled_back() {
        let mut world = testing::world();
        let ledger_before = world.chain.ledger().clone();
        let err = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, BAT], testing::usdc(1_000))
            .unwrap_err();
        assert_eq!(err.reason(), "Pool does not exist");
        assert_eq!(world.chain.ledger(), &ledger_before);
    }

    #[test]
    fn test_loan_larger_than_provider_liquidity() {
        let mut world = testing::world();
        let err = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, WETH], U256::MAX)
            .unwrap_err();
        assert!(matches!(err, ArbError::Provider(_)));
    }

    #[test]
    fn test_removed_venue_no_longer_routable() {
        let mut world = testing::world();
        world.engine.remove_exchange_router(OWNER, SUSHISWAP).unwrap();
        assert!(world.engine.exchanges_info(SUSHISWAP).is_null());
        assert!(!world.engine.get_exchanges().contains(&SUSHISWAP.to_string()));

        let err = world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, WETH], testing::usdc(1))
            .unwrap_err();
        assert_eq!(err, ArbError::VenueNotRegistered(SUSHISWAP.to_string()));
    }

    #[test]
    fn test_admin_requires_owner() {
        let mut world = testing::world();
        let stranger = Address::repeat_byte(0x66);
        let before = world.engine.get_exchanges();

        let err = world
            .engine
            .add_exchange_router(stranger, "EVIL", stranger, stranger, VenueKind::PairStyle)
            .unwrap_err();
        assert_eq!(err.reason(), "Caller is not the owner");
        assert!(world.engine.remove_exchange_router(stranger, UNISWAP_V2).is_err());
        assert_eq!(world.engine.get_exchanges(), before);
    }

    #[test]
    fn test_execute_dispatches_on_provider() {
        let mut world = testing::world();
        let report = world
            .engine
            .execute(&mut world.chain, ProviderId::Aave, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, WETH], testing::usdc(1_000))
            .unwrap();
        assert_eq!(report.provider, ProviderId::Aave);
        assert_eq!(report.fee, U256::from(500_000u64));
    }

    #[test]
    fn test_success_emits_events_from_engine() {
        let mut world = testing::world();
        world
            .engine
            .execute_flash_swap(&mut world.chain, names(&[UNISWAP_V2, SUSHISWAP]), vec![USDC, WETH], testing::usdc(1_000))
            .unwrap();
        let events: Vec<&str> = world
            .chain
            .logs()
            .iter()
            .filter(|l| l.emitter == ENGINE)
            .map(|l| l.event.name())
            .collect();
        assert_eq!(events, vec!["HopExecuted", "HopExecuted", "FlashSwapExecuted"]);
    }
}
