//! Reference world for unit tests
//!
//! USDC/WETH trade at 2000 on UNISWAP_V2, 2200 on SUSHISWAP and 2200 on the
//! UNISWAP_V3 quoter venue. A WETH → BAT → USDC leg (SUSHISWAP, UNISWAP_V2)
//! closes a profitable three-hop cycle. Both loan providers hold USDC and WETH.

use crate::chain::{Chain, Contract};
use crate::engine::{EngineConfig, FlashSwapEngine};
use crate::lending::{AavePool, BalancerVault, DEFAULT_PREMIUM_BPS};
use crate::types::{VenueKind, DEFAULT_QUOTER_FEE_TIER};
use crate::venues::{PairFactory, PairRouter, PoolFactory, Quoter, SwapRouter};
use alloy::primitives::{address, Address, U256};

pub const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
pub const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
pub const BAT: Address = address!("0d8775f648430679a709e98d2b0cb6250d2887ef");

pub const OWNER: Address = Address::repeat_byte(0x0e);
pub const ENGINE: Address = Address::repeat_byte(0xe9);
pub const VAULT: Address = Address::repeat_byte(0xba);
pub const AAVE_POOL: Address = Address::repeat_byte(0xaa);

pub const UNISWAP_V2: &str = "UNISWAP_V2";
pub const SUSHISWAP: &str = "SUSHISWAP";
pub const UNISWAP_V3: &str = "UNISWAP_V3";

const UNI_V2_FACTORY: Address = Address::repeat_byte(0x21);
const UNI_V2_ROUTER: Address = Address::repeat_byte(0x22);
const SUSHI_FACTORY: Address = Address::repeat_byte(0x51);
const SUSHI_ROUTER: Address = Address::repeat_byte(0x52);
const UNI_V3_FACTORY: Address = Address::repeat_byte(0x31);
const UNI_V3_QUOTER: Address = Address::repeat_byte(0x32);
const UNI_V3_ROUTER: Address = Address::repeat_byte(0x33);

pub const TIMESTAMP: u64 = 1_700_000_000;

pub struct World {
    pub chain: Chain,
    pub engine: FlashSwapEngine,
}

fn units(amount: u64, decimals: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(decimals))
}

pub fn usdc(amount: u64) -> U256 {
    units(amount, 6)
}

pub fn weth(amount: u64) -> U256 {
    units(amount, 18)
}

pub fn bat(amount: u64) -> U256 {
    units(amount, 18)
}

fn seed_pair(chain: &mut Chain, factory: Address, (token_a, reserve_a): (Address, U256), (token_b, reserve_b): (Address, U256)) {
    let pair = chain.pair_factory_mut(factory).unwrap().create_pair(token_a, token_b).unwrap();
    chain.ledger_mut().mint(token_a, pair, reserve_a).unwrap();
    chain.ledger_mut().mint(token_b, pair, reserve_b).unwrap();
}

pub fn world() -> World {
    world_with_vault_fee(0)
}

/// Reference world whose Balancer vault charges `fee_bps`
pub fn world_with_vault_fee(fee_bps: u32) -> World {
    let mut chain = Chain::new(TIMESTAMP);

    // Constant-product venues
    for (factory, router) in [(UNI_V2_FACTORY, UNI_V2_ROUTER), (SUSHI_FACTORY, SUSHI_ROUTER)] {
        chain.deploy(factory, Contract::PairFactory(PairFactory::new(factory))).unwrap();
        chain.deploy(router, Contract::PairRouter(PairRouter::new(router, factory))).unwrap();
    }
    seed_pair(&mut chain, UNI_V2_FACTORY, (USDC, usdc(2_000_000)), (WETH, weth(1_000)));
    seed_pair(&mut chain, UNI_V2_FACTORY, (BAT, bat(2_000_000)), (USDC, usdc(880_000)));
    seed_pair(&mut chain, SUSHI_FACTORY, (USDC, usdc(2_200_000)), (WETH, weth(1_000)));
    seed_pair(&mut chain, SUSHI_FACTORY, (WETH, weth(1_000)), (BAT, bat(5_000_000)));

    // Concentrated venue: sqrt(raw WETH per raw USDC) ≈ 21320 → 2200 USDC/WETH,
    // liquidity sized to the same depth as the SUSHISWAP pair
    chain.deploy(UNI_V3_FACTORY, Contract::PoolFactory(PoolFactory::new(UNI_V3_FACTORY))).unwrap();
    chain.deploy(UNI_V3_QUOTER, Contract::Quoter(Quoter::new(UNI_V3_QUOTER, UNI_V3_FACTORY))).unwrap();
    chain
        .deploy(UNI_V3_ROUTER, Contract::SwapRouter(SwapRouter::new(UNI_V3_ROUTER, UNI_V3_FACTORY)))
        .unwrap();
    let v3_pool = chain
        .pool_factory_mut(UNI_V3_FACTORY)
        .unwrap()
        .create_pool(USDC, WETH, DEFAULT_QUOTER_FEE_TIER, U256::from(21_320u64) << 96usize, 46_904_000_000_000_000u128)
        .unwrap();
    chain.ledger_mut().mint(USDC, v3_pool, usdc(2_200_000)).unwrap();
    chain.ledger_mut().mint(WETH, v3_pool, weth(1_000)).unwrap();

    // Loan providers
    chain.deploy(VAULT, Contract::BalancerVault(BalancerVault::new(VAULT, fee_bps))).unwrap();
    chain
        .deploy(AAVE_POOL, Contract::AavePool(AavePool::new(AAVE_POOL, DEFAULT_PREMIUM_BPS)))
        .unwrap();
    for provider in [VAULT, AAVE_POOL] {
        chain.ledger_mut().mint(USDC, provider, usdc(1_000_000)).unwrap();
        chain.ledger_mut().mint(WETH, provider, weth(1_000)).unwrap();
    }

    let mut engine = FlashSwapEngine::new(EngineConfig::new(ENGINE, OWNER, VAULT, AAVE_POOL));
    engine
        .add_exchange_router(OWNER, UNISWAP_V2, UNI_V2_ROUTER, UNI_V2_FACTORY, VenueKind::PairStyle)
        .unwrap();
    engine
        .add_exchange_router(OWNER, SUSHISWAP, SUSHI_ROUTER, SUSHI_FACTORY, VenueKind::PairStyle)
        .unwrap();
    engine
        .add_exchange_router(OWNER, UNISWAP_V3, UNI_V3_ROUTER, UNI_V3_QUOTER, VenueKind::QuoterStyle)
        .unwrap();

    World { chain, engine }
}
