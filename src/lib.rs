//! Flash Swap Engine Library
//!
//! Atomic, flash-loan funded arbitrage across heterogeneous DEX venues.
//! Includes the engine (registry, route validation, swap dispatch, loan
//! callbacks, custody) and the simulated chain it executes on.
//!
//! Created: 2026-10-16

pub mod chain;
pub mod config;
pub mod contracts;
pub mod custody;
pub mod engine;
pub mod error;
pub mod events;
pub mod lending;
pub mod registry;
pub mod types;
pub mod venues;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use chain::Chain;
pub use config::{Deployment, ScenarioConfig};
pub use engine::{EngineConfig, FlashSwapEngine};
pub use error::{ArbError, ArbResult};
pub use registry::ExchangeRegistry;
pub use types::{ArbitrageRoute, ExchangeEntry, ExchangeInfo, ExecutionReport, ProviderId, VenueKind};
