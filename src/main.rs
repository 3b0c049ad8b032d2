//! Flash Swap Runner
//!
//! Loads a scenario, deploys it into a fresh simulated chain and executes
//! its routes through the flash swap engine, one transaction per route.
//! Failed routes are reported and leave no trace on the chain.
//!
//! Usage:
//!     flashswap --config config/scenario.toml
//!     flashswap --route 1 --json
//!
//! Created: 2026-10-16

use anyhow::{Context, Result};
use clap::Parser;
use flashswap_engine::config::{ScenarioConfig, DEFAULT_SCENARIO_PATH};
use flashswap_engine::types::format_units;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Flash-loan funded multi-DEX arbitrage runner
#[derive(Parser)]
#[command(name = "flashswap")]
struct Args {
    /// Scenario TOML file
    #[arg(short, long, env = "SCENARIO_CONFIG", default_value = DEFAULT_SCENARIO_PATH)]
    config: String,

    /// Run only the route at this index (0-based)
    #[arg(short, long)]
    route: Option<usize>,

    /// Print execution reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let scenario = ScenarioConfig::load(&args.config)?;
    let mut deployment = scenario
        .deploy()
        .with_context(|| format!("Failed to deploy scenario {}", args.config))?;
    info!("Scenario loaded from {}", args.config);
    info!("Exchanges: {}", deployment.engine.get_exchanges().join(", "));

    let selected: Vec<usize> = match args.route {
        Some(index) if index < deployment.routes.len() => vec![index],
        Some(index) => anyhow::bail!("Route {} out of range ({} routes)", index, deployment.routes.len()),
        None => (0..deployment.routes.len()).collect(),
    };

    let mut succeeded = 0usize;
    for index in &selected {
        let plan = deployment.routes[*index].clone();
        info!(
            "Route {} [{}]: {} via {} ({} in)",
            index,
            plan.name,
            plan.provider,
            plan.exchange_names.join(" -> "),
            format_units(plan.amount, plan.decimals)
        );

        match deployment.engine.execute(
            &mut deployment.chain,
            plan.provider,
            plan.exchange_names.clone(),
            plan.tokens.clone(),
            plan.amount,
        ) {
            Ok(report) => {
                succeeded += 1;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
                } else {
                    for hop in &report.hops {
                        info!("  {}: {:?} -> {:?} out {}", hop.exchange, hop.token_in, hop.token_out, hop.amount_out);
                    }
                    info!(
                        "  ✅ fee {} | final {} | profit {}",
                        format_units(report.fee, plan.decimals),
                        format_units(report.final_amount, plan.decimals),
                        format_units(report.profit, plan.decimals)
                    );
                }
            }
            Err(e) if e.is_authorization() => error!("  ❌ {} rejected: {}", plan.name, e),
            Err(e) => warn!("  ❌ {} reverted: {}", plan.name, e),
        }
    }

    let owner = deployment.engine.owner();
    for (symbol, token) in &deployment.tokens {
        let balance = deployment
            .engine
            .get_token_balance(&deployment.chain, owner, token.address)?;
        if !balance.is_zero() {
            info!("Engine holds {} {}", format_units(balance, token.decimals), symbol);
        }
    }
    info!("{}/{} routes executed", succeeded, selected.len());
    Ok(())
}
