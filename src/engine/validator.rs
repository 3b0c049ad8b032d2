//! Route Validator
//!
//! Side-effect-free checks run before any loan is requested or any venue is
//! touched. Order matters: the first failing check decides the error.

use crate::error::{ArbError, ArbResult, INVALID_EXCHANGE_NAMES_LENGTH, INVALID_TOKENS_LENGTH};
use crate::registry::ExchangeRegistry;
use crate::types::{ArbitrageRoute, ExchangeEntry};
use alloy::primitives::U256;

/// Minimum number of hops in a closed cycle
pub const MIN_ROUTE_LEN: usize = 2;

/// Route shape and amount checks
pub fn validate_shape(route: &ArbitrageRoute, borrowed_amount: U256) -> ArbResult<()> {
    if route.exchange_names.len() < MIN_ROUTE_LEN {
        return Err(ArbError::InvalidRouteLength(INVALID_EXCHANGE_NAMES_LENGTH));
    }
    if route.tokens.len() < MIN_ROUTE_LEN {
        return Err(ArbError::InvalidRouteLength(INVALID_TOKENS_LENGTH));
    }
    if route.exchange_names.len() != route.tokens.len() {
        return Err(ArbError::LengthMismatch);
    }
    if borrowed_amount.is_zero() {
        return Err(ArbError::InvalidAmount);
    }
    Ok(())
}

/// Resolve every hop's venue, in hop order
pub fn resolve_venues<'r>(registry: &'r ExchangeRegistry, route: &ArbitrageRoute) -> ArbResult<Vec<&'r ExchangeEntry>> {
    route
        .exchange_names
        .iter()
        .map(|name| {
            registry
                .entry(name)
                .ok_or_else(|| ArbError::VenueNotRegistered(name.clone()))
        })
        .collect()
}

/// Full pre-flight check. Returns the resolved venues so callers never
/// look them up twice.
pub fn validate_route<'r>(
    registry: &'r ExchangeRegistry,
    route: &ArbitrageRoute,
    borrowed_amount: U256,
) -> ArbResult<Vec<&'r ExchangeEntry>> {
    validate_shape(route, borrowed_amount)?;
    resolve_venues(registry, route)
}
