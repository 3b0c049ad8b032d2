//! Scenario Configuration
//!
//! A TOML file describing a complete world to run the engine against:
//! tokens, exchange venues with their liquidity, loan providers, the engine
//! itself and the routes to execute. Addresses and amounts are strings;
//! token amounts are in whole units and scaled by the token's decimals.
//!
//! Default path: config/scenario.toml (override with SCENARIO_CONFIG or --config)
//!
//! Created: 2026-10-16

use crate::chain::{Chain, Contract};
use crate::engine::{EngineConfig, FlashSwapEngine};
use crate::lending::{AavePool, BalancerVault, DEFAULT_PREMIUM_BPS};
use crate::types::{parse_units, ProviderId, VenueKind, DEFAULT_DEADLINE_SECS, DEFAULT_QUOTER_FEE_TIER};
use crate::venues::{PairFactory, PairRouter, PoolFactory, Quoter, SwapRouter};
use alloy::primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub const DEFAULT_SCENARIO_PATH: &str = "config/scenario.toml";

/// Top-level TOML structure
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub chain: ChainSection,
    pub engine: EngineSection,
    pub balancer: BalancerSection,
    pub aave: AaveSection,
    #[serde(rename = "token")]
    pub tokens: Vec<TokenSection>,
    #[serde(rename = "exchange", default)]
    pub exchanges: Vec<ExchangeSection>,
    #[serde(rename = "route", default)]
    pub routes: Vec<RouteSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainSection {
    /// Block timestamp in seconds; defaults to the current time
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    pub address: String,
    pub owner: String,
    #[serde(default = "default_fee_tier")]
    pub quoter_fee_tier: u32,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_fee_tier() -> u32 { DEFAULT_QUOTER_FEE_TIER }
fn default_deadline_secs() -> u64 { DEFAULT_DEADLINE_SECS }
fn default_premium_bps() -> u32 { DEFAULT_PREMIUM_BPS }

#[derive(Debug, Clone, Deserialize)]
pub struct BalancerSection {
    pub address: String,
    #[serde(default)]
    pub fee_bps: u32,
    /// symbol → whole-token amount the vault can lend
    #[serde(default)]
    pub liquidity: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AaveSection {
    pub address: String,
    #[serde(default = "default_premium_bps")]
    pub premium_bps: u32,
    #[serde(default)]
    pub liquidity: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSection {
    pub symbol: String,
    pub address: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSection {
    pub name: String,
    pub kind: VenueKind,
    pub router: String,
    pub factory: String,
    /// Required for quoter venues
    pub quoter: Option<String>,
    #[serde(rename = "pair", default)]
    pub pairs: Vec<PairSection>,
    #[serde(rename = "pool", default)]
    pub pools: Vec<PoolSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairSection {
    pub tokens: [String; 2],
    pub reserves: [String; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    pub tokens: [String; 2],
    #[serde(default = "default_fee_tier")]
    pub fee: u32,
    pub sqrt_price_x96: String,
    pub liquidity: String,
    /// Token balances held by the pool, matching `tokens`
    pub balances: [String; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteSection {
    pub name: String,
    pub provider: ProviderId,
    pub exchanges: Vec<String>,
    pub tokens: Vec<String>,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub decimals: u32,
}

/// A route ready to hand to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub name: String,
    pub provider: ProviderId,
    pub exchange_names: Vec<String>,
    pub tokens: Vec<Address>,
    pub amount: U256,
    /// Decimals of the borrowed token, for display
    pub decimals: u32,
}

/// The world built from a scenario
#[derive(Debug, Clone)]
pub struct Deployment {
    pub chain: Chain,
    pub engine: FlashSwapEngine,
    pub tokens: HashMap<String, TokenInfo>,
    pub routes: Vec<RoutePlan>,
}

fn parse_address(value: &str, what: &str) -> Result<Address> {
    Address::from_str(value.trim()).with_context(|| format!("Invalid {} address: {}", what, value))
}

fn parse_u256(value: &str, what: &str) -> Result<U256> {
    U256::from_str(value.trim()).with_context(|| format!("Invalid {}: {}", what, value))
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read scenario file: {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse scenario TOML")
    }

    fn token_table(&self) -> Result<HashMap<String, TokenInfo>> {
        let mut tokens = HashMap::new();
        for token in &self.tokens {
            let info = TokenInfo {
                address: parse_address(&token.address, &token.symbol)?,
                decimals: token.decimals,
            };
            if tokens.insert(token.symbol.clone(), info).is_some() {
                bail!("Duplicate token symbol: {}", token.symbol);
            }
        }
        Ok(tokens)
    }

    /// Build the chain, deploy every venue and provider, register the
    /// exchanges with the engine and resolve the routes.
    pub fn deploy(&self) -> Result<Deployment> {
        let tokens = self.token_table()?;
        let lookup = |symbol: &str| -> Result<TokenInfo> {
            tokens
                .get(symbol)
                .copied()
                .with_context(|| format!("Unknown token symbol: {}", symbol))
        };
        let amount_of = |symbol: &str, amount: &str| -> Result<(Address, U256)> {
            let token = lookup(symbol)?;
            let raw = parse_units(amount, token.decimals)
                .with_context(|| format!("Invalid {} amount: {}", symbol, amount))?;
            Ok((token.address, raw))
        };

        let timestamp = match self.chain.timestamp {
            Some(ts) => ts,
            None => u64::try_from(chrono::Utc::now().timestamp()).context("System clock before epoch")?,
        };
        let mut chain = Chain::new(timestamp);

        // Loan providers
        let vault = parse_address(&self.balancer.address, "balancer vault")?;
        chain.deploy(vault, Contract::BalancerVault(BalancerVault::new(vault, self.balancer.fee_bps)))?;
        for (symbol, amount) in &self.balancer.liquidity {
            let (token, raw) = amount_of(symbol, amount)?;
            chain.ledger_mut().mint(token, vault, raw)?;
        }

        let pool = parse_address(&self.aave.address, "aave pool")?;
        chain.deploy(pool, Contract::AavePool(AavePool::new(pool, self.aave.premium_bps)))?;
        for (symbol, amount) in &self.aave.liquidity {
            let (token, raw) = amount_of(symbol, amount)?;
            chain.ledger_mut().mint(token, pool, raw)?;
        }

        // Engine
        let owner = parse_address(&self.engine.owner, "owner")?;
        let engine_config = EngineConfig {
            address: parse_address(&self.engine.address, "engine")?,
            owner,
            balancer_vault: vault,
            aave_pool: pool,
            quoter_fee_tier: self.engine.quoter_fee_tier,
            deadline_secs: self.engine.deadline_secs,
        };
        let mut engine = FlashSwapEngine::new(engine_config);

        // Venues
        for exchange in &self.exchanges {
            let router = parse_address(&exchange.router, &exchange.name)?;
            let factory = parse_address(&exchange.factory, &exchange.name)?;

            let aux = match exchange.kind {
                VenueKind::PairStyle => {
                    if !exchange.pools.is_empty() {
                        bail!("Exchange {} is a pair venue but declares pools", exchange.name);
                    }
                    chain.deploy(factory, Contract::PairFactory(PairFactory::new(factory)))?;
                    chain.deploy(router, Contract::PairRouter(PairRouter::new(router, factory)))?;
                    for pair in &exchange.pairs {
                        let (token_a, reserve_a) = amount_of(&pair.tokens[0], &pair.reserves[0])?;
                        let (token_b, reserve_b) = amount_of(&pair.tokens[1], &pair.reserves[1])?;
                        let address = chain
                            .pair_factory_mut(factory)?
                            .create_pair(token_a, token_b)
                            .with_context(|| format!("{}: {}/{}", exchange.name, pair.tokens[0], pair.tokens[1]))?;
                        chain.ledger_mut().mint(token_a, address, reserve_a)?;
                        chain.ledger_mut().mint(token_b, address, reserve_b)?;
                    }
                    factory
                }
                VenueKind::QuoterStyle => {
                    if !exchange.pairs.is_empty() {
                        bail!("Exchange {} is a quoter venue but declares pairs", exchange.name);
                    }
                    let quoter_str = exchange
                        .quoter
                        .as_deref()
                        .with_context(|| format!("Exchange {} needs a quoter address", exchange.name))?;
                    let quoter = parse_address(quoter_str, &exchange.name)?;
                    chain.deploy(factory, Contract::PoolFactory(PoolFactory::new(factory)))?;
                    chain.deploy(quoter, Contract::Quoter(Quoter::new(quoter, factory)))?;
                    chain.deploy(router, Contract::SwapRouter(SwapRouter::new(router, factory)))?;
                    for pool in &exchange.pools {
                        let (token_a, balance_a) = amount_of(&pool.tokens[0], &pool.balances[0])?;
                        let (token_b, balance_b) = amount_of(&pool.tokens[1], &pool.balances[1])?;
                        let sqrt_price = parse_u256(&pool.sqrt_price_x96, "sqrt_price_x96")?;
                        let liquidity: u128 = pool
                            .liquidity
                            .trim()
                            .parse()
                            .with_context(|| format!("Invalid liquidity: {}", pool.liquidity))?;
                        let address = chain
                            .pool_factory_mut(factory)?
                            .create_pool(token_a, token_b, pool.fee, sqrt_price, liquidity)
                            .with_context(|| format!("{}: {}/{}", exchange.name, pool.tokens[0], pool.tokens[1]))?;
                        chain.ledger_mut().mint(token_a, address, balance_a)?;
                        chain.ledger_mut().mint(token_b, address, balance_b)?;
                    }
                    quoter
                }
            };

            engine
                .add_exchange_router(owner, &exchange.name, router, aux, exchange.kind)
                .with_context(|| format!("Failed to register exchange {}", exchange.name))?;
            debug!("Exchange {} deployed", exchange.name);
        }

        // Routes
        let mut routes = Vec::with_capacity(self.routes.len());
        for route in &self.routes {
            let start = route
                .tokens
                .first()
                .with_context(|| format!("Route {} has no tokens", route.name))?;
            let (_, amount) = amount_of(start, &route.amount)?;
            let addresses = route
                .tokens
                .iter()
                .map(|symbol| lookup(symbol).map(|t| t.address))
                .collect::<Result<Vec<_>>>()?;
            routes.push(RoutePlan {
                name: route.name.clone(),
                provider: route.provider,
                exchange_names: route.exchanges.clone(),
                tokens: addresses,
                amount,
                decimals: lookup(start)?.decimals,
            });
        }

        info!(
            "Scenario deployed: {} tokens, {} exchanges, {} routes",
            tokens.len(),
            self.exchanges.len(),
            routes.len()
        );
        Ok(Deployment {
            chain,
            engine,
            tokens,
            routes,
        })
    }
}
