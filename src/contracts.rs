//! Centralized Solidity Type Definitions
//!
//! ABI types shared between the engine and its loan providers, defined
//! with alloy's `sol!` macro:
//! - `RouteParams` travels as the opaque `userData` / `params` blob of a flash loan
//! - events are the engine's observable completion signals
//!
//! Created: 2026-10-16

use alloy::sol;

// ── Flash loan payload ───────────────────────────────────────────────

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct RouteParams {
        string[] exchangeNames;
        address[] tokens;
    }
}

// ── Custody events ───────────────────────────────────────────────────

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event ReceivedETH(address indexed from, uint256 amount);

    #[derive(Debug, PartialEq, Eq)]
    event WithdrawETH(address indexed to, uint256 amount);

    #[derive(Debug, PartialEq, Eq)]
    event WithdrawnTokens(address indexed token, address indexed to, uint256 amount);
}

// ── Arbitrage events ─────────────────────────────────────────────────

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event HopExecuted(string exchange, address indexed tokenIn, address indexed tokenOut, uint256 amountIn, uint256 amountOut);

    #[derive(Debug, PartialEq, Eq)]
    event FlashSwapExecuted(string provider, address indexed token, uint256 amount, uint256 fee, uint256 finalAmount, uint256 profit);
}
