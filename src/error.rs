//! Engine Error Taxonomy
//!
//! Every failure aborts the enclosing top-level call. The `Display` form of
//! each variant is the short reason string surfaced to callers.
//!
//! Created: 2026-10-16

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Reason strings for the route-shape gate
pub const INVALID_EXCHANGE_NAMES_LENGTH: &str = "Invalid exchange names length";
pub const INVALID_TOKENS_LENGTH: &str = "Invalid tokens address length";

/// Reason strings for callback identity checks
pub const INVALID_VAULT_ADDRESS: &str = "Invalid vault address";
pub const INVALID_POOL_ADDRESS: &str = "Invalid pool address";
pub const INVALID_INITIATOR: &str = "Invalid initiator";
pub const UNSOLICITED_FLASH_LOAN: &str = "Flash loan not requested";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbError {
    // ── Registry ────────────────────────────────────────────────────────
    #[error("Already registered DEX")]
    DuplicateVenue(String),

    #[error("DEX not registered")]
    VenueNotFound(String),

    // ── Route validation ────────────────────────────────────────────────
    #[error("{0}")]
    InvalidRouteLength(&'static str),

    #[error("Invalid lengths")]
    LengthMismatch,

    #[error("Invalid borrowed amount")]
    InvalidAmount,

    // ── Discovery ───────────────────────────────────────────────────────
    #[error("Exchange not registered")]
    VenueNotRegistered(String),

    #[error("Pool does not exist")]
    PoolNotFound { token_in: Address, token_out: Address },

    // ── Authorization ───────────────────────────────────────────────────
    #[error("{0}")]
    UnauthorizedCallback(&'static str),

    #[error("Caller is not the owner")]
    NotOwner(Address),

    // ── Economic ────────────────────────────────────────────────────────
    #[error("Arbitrage not profitable")]
    Unprofitable { final_amount: U256, required: U256 },

    // ── Host / external collaborators ───────────────────────────────────
    #[error("Insufficient balance")]
    InsufficientBalance { token: Address, holder: Address },

    #[error("Insufficient allowance")]
    InsufficientAllowance { token: Address, owner: Address, spender: Address },

    #[error("Call to non-contract address")]
    NoContract(Address),

    #[error("Address already in use")]
    AddressInUse(Address),

    #[error("{0}")]
    Venue(String),

    #[error("{0}")]
    Provider(String),

    #[error("Invalid callback params")]
    InvalidCallbackParams,

    #[error("Arithmetic overflow")]
    Overflow,
}

impl ArbError {
    /// Short machine-readable reason, identical to the `Display` output
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// True for failures that signal misuse or an attack attempt
    pub fn is_authorization(&self) -> bool {
        matches!(self, ArbError::UnauthorizedCallback(_) | ArbError::NotOwner(_))
    }
}

pub type ArbResult<T> = std::result::Result<T, ArbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            ArbError::InvalidRouteLength(INVALID_TOKENS_LENGTH).reason(),
            "Invalid tokens address length"
        );
        assert_eq!(
            ArbError::UnauthorizedCallback(INVALID_VAULT_ADDRESS).reason(),
            "Invalid vault address"
        );
        assert_eq!(
            ArbError::Unprofitable { final_amount: U256::ZERO, required: U256::from(1) }.reason(),
            "Arbitrage not profitable"
        );
        assert_eq!(
            ArbError::PoolNotFound { token_in: Address::ZERO, token_out: Address::ZERO }.reason(),
            "Pool does not exist"
        );
    }

    #[test]
    fn test_authorization_classification() {
        assert!(ArbError::NotOwner(Address::ZERO).is_authorization());
        assert!(ArbError::UnauthorizedCallback(INVALID_INITIATOR).is_authorization());
        assert!(!ArbError::LengthMismatch.is_authorization());
    }
}
