//! Core data structures
//!
//! Registry entries, the caller-supplied route, per-call loan context and
//! the execution report handed back to callers.

use crate::contracts::RouteParams;
use crate::error::{ArbError, ArbResult};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fee tier used when quoting QuoterStyle venues (0.30%)
pub const DEFAULT_QUOTER_FEE_TIER: u32 = 3000;

/// Swap deadline offset applied to the current block timestamp (5 minutes)
pub const DEFAULT_DEADLINE_SECS: u64 = 300;

/// Exchange interface variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VenueKind {
    /// Constant-product router + factory (Uniswap V2 style)
    #[default]
    #[serde(rename = "pair", alias = "pair_style")]
    PairStyle,
    /// Single-pool swap router + quoter (Uniswap V3 style)
    #[serde(rename = "quoter", alias = "quoter_style")]
    QuoterStyle,
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VenueKind::PairStyle => write!(f, "PairStyle"),
            VenueKind::QuoterStyle => write!(f, "QuoterStyle"),
        }
    }
}

/// A registered exchange venue
///
/// `primary` is always the router. `secondary` is the pair factory for
/// PairStyle venues and the quoter for QuoterStyle venues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeEntry {
    pub name: String,
    pub primary: Address,
    pub secondary: Address,
    pub kind: VenueKind,
}

impl ExchangeEntry {
    pub fn info(&self) -> ExchangeInfo {
        ExchangeInfo {
            primary: self.primary,
            secondary: self.secondary,
            kind: self.kind,
        }
    }
}

/// The `(primary, secondary, kind)` triple returned by registry lookups.
/// `ExchangeInfo::default()` is the null triple returned for absent names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExchangeInfo {
    pub primary: Address,
    pub secondary: Address,
    pub kind: VenueKind,
}

impl ExchangeInfo {
    pub fn is_null(&self) -> bool {
        *self == ExchangeInfo::default()
    }
}

/// Flash loan providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Balancer,
    Aave,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderId::Balancer => write!(f, "balancer"),
            ProviderId::Aave => write!(f, "aave"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balancer" => Ok(ProviderId::Balancer),
            "aave" => Ok(ProviderId::Aave),
            other => Err(format!("unknown loan provider '{}'", other)),
        }
    }
}

/// One swap step derived from a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop<'a> {
    pub venue: &'a str,
    pub token_in: Address,
    pub token_out: Address,
}

/// Caller-supplied closed trading cycle. Hop `i` swaps `tokens[i]` into
/// `tokens[(i + 1) % len]` on `exchange_names[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrageRoute {
    pub exchange_names: Vec<String>,
    pub tokens: Vec<Address>,
}

impl ArbitrageRoute {
    pub fn new(exchange_names: Vec<String>, tokens: Vec<Address>) -> Self {
        Self {
            exchange_names,
            tokens,
        }
    }

    /// The borrowed token. Only meaningful once the route shape is validated.
    pub fn start_token(&self) -> Option<Address> {
        self.tokens.first().copied()
    }

    /// Hops in execution order; the last hop always returns to `tokens[0]`
    pub fn hops(&self) -> Vec<Hop<'_>> {
        let len = self.tokens.len();
        self.exchange_names
            .iter()
            .zip(self.tokens.iter())
            .enumerate()
            .map(|(i, (venue, token_in))| Hop {
                venue: venue.as_str(),
                token_in: *token_in,
                token_out: self.tokens[(i + 1) % len],
            })
            .collect()
    }

    /// ABI-encode for the flash loan `userData` / `params` blob
    pub fn encode(&self) -> Bytes {
        RouteParams {
            exchangeNames: self.exchange_names.clone(),
            tokens: self.tokens.clone(),
        }
        .abi_encode()
        .into()
    }

    pub fn decode(data: &[u8]) -> ArbResult<Self> {
        let params = RouteParams::abi_decode(data).map_err(|_| ArbError::InvalidCallbackParams)?;
        Ok(Self::new(params.exchangeNames, params.tokens))
    }
}

/// Loan in flight. Lives only on the callback's stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanContext {
    pub borrowed_token: Address,
    pub borrowed_amount: U256,
    pub fee: U256,
    pub provider: ProviderId,
}

impl LoanContext {
    /// Principal plus provider fee
    pub fn repayment(&self) -> ArbResult<U256> {
        self.borrowed_amount.checked_add(self.fee).ok_or(ArbError::Overflow)
    }
}

/// Per-hop outcome recorded in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopReport {
    pub exchange: String,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Result of a successful flash swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub provider: ProviderId,
    pub borrowed_token: Address,
    pub borrowed_amount: U256,
    pub fee: U256,
    pub final_amount: U256,
    pub profit: U256,
    pub hops: Vec<HopReport>,
}

impl ExecutionReport {
    /// JSON view with amounts as decimal strings
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": self.provider.to_string(),
            "borrowed_token": format!("{:?}", self.borrowed_token),
            "borrowed_amount": self.borrowed_amount.to_string(),
            "fee": self.fee.to_string(),
            "final_amount": self.final_amount.to_string(),
            "profit": self.profit.to_string(),
            "hops": self.hops.iter().map(|h| serde_json::json!({
                "exchange": h.exchange,
                "token_in": format!("{:?}", h.token_in),
                "token_out": format!("{:?}", h.token_out),
                "amount_in": h.amount_in.to_string(),
                "amount_out": h.amount_out.to_string(),
            })).collect::<Vec<_>>(),
        })
    }
}

/// Render a raw token amount in whole-token units (e.g. 10826500000 @ 6 → "10826.500000").
/// Falls back to the raw integer when it does not fit a `Decimal`.
pub fn format_units(amount: U256, decimals: u32) -> String {
    let raw = amount.to_string();
    match Decimal::from_str(&raw) {
        Ok(mut value) => match value.set_scale(decimals) {
            Ok(()) => value.to_string(),
            Err(_) => raw,
        },
        Err(_) => raw,
    }
}

/// Parse a whole-token amount ("10000", "0.5") into raw units.
/// None for negative values, malformed input or more fractional digits than `decimals`.
pub fn parse_units(amount: &str, decimals: u32) -> Option<U256> {
    let value = Decimal::from_str(amount.trim()).ok()?;
    if value.is_sign_negative() || value.scale() > decimals {
        return None;
    }
    let mantissa = u128::try_from(value.mantissa()).ok()?;
    let factor = U256::from(10u64).checked_pow(U256::from(decimals - value.scale()))?;
    U256::from(mantissa).checked_mul(factor)
}
