//! Event Log Entries
//!
//! Events live in the chain log and are discarded together with every other
//! state change when a transaction rolls back.

use crate::contracts::{FlashSwapExecuted, HopExecuted, ReceivedETH, WithdrawETH, WithdrawnTokens};
use alloy::primitives::Address;

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ReceivedEth(ReceivedETH),
    WithdrawEth(WithdrawETH),
    WithdrawnTokens(WithdrawnTokens),
    HopExecuted(HopExecuted),
    FlashSwapExecuted(FlashSwapExecuted),
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::ReceivedEth(_) => "ReceivedETH",
            EngineEvent::WithdrawEth(_) => "WithdrawETH",
            EngineEvent::WithdrawnTokens(_) => "WithdrawnTokens",
            EngineEvent::HopExecuted(_) => "HopExecuted",
            EngineEvent::FlashSwapExecuted(_) => "FlashSwapExecuted",
        }
    }
}

/// A single log record: who emitted it and what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub emitter: Address,
    pub event: EngineEvent,
}
