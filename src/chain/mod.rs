//! Simulated Execution Host
//!
//! A deterministic, single-threaded stand-in for the EVM world the engine
//! runs on: token ledger, deployed contracts (exchange venues and loan
//! providers), an event log and a block timestamp.
//!
//! `Chain::transact` is the all-or-nothing boundary. It checkpoints the
//! world before running a call and restores the checkpoint if the call
//! returns an error, so a failed call leaves no observable trace.
//!
//! Created: 2026-10-16

pub mod ledger;

pub use ledger::Ledger;

use crate::error::{ArbError, ArbResult};
use crate::events::{EngineEvent, Log};
use crate::lending::{AavePool, BalancerVault};
use crate::venues::{PairFactory, PairRouter, PoolFactory, Quoter, SwapRouter};
use alloy::primitives::{Address, B256};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Contracts that can live at an address
#[derive(Debug, Clone)]
pub enum Contract {
    PairFactory(PairFactory),
    PairRouter(PairRouter),
    PoolFactory(PoolFactory),
    Quoter(Quoter),
    SwapRouter(SwapRouter),
    BalancerVault(BalancerVault),
    AavePool(AavePool),
}

impl Contract {
    pub fn kind(&self) -> &'static str {
        match self {
            Contract::PairFactory(_) => "PairFactory",
            Contract::PairRouter(_) => "PairRouter",
            Contract::PoolFactory(_) => "PoolFactory",
            Contract::Quoter(_) => "Quoter",
            Contract::SwapRouter(_) => "SwapRouter",
            Contract::BalancerVault(_) => "BalancerVault",
            Contract::AavePool(_) => "AavePool",
        }
    }
}

/// Everything a reverted transaction must leave untouched
#[derive(Debug, Clone, Default)]
struct WorldState {
    ledger: Ledger,
    contracts: HashMap<Address, Contract>,
    logs: Vec<Log>,
    /// Outstanding flash loan requests, keyed by borrower
    pending_loans: HashMap<Address, B256>,
}

#[derive(Debug, Clone, Default)]
pub struct Chain {
    state: WorldState,
    timestamp: u64,
}

impl Chain {
    pub fn new(timestamp: u64) -> Self {
        Self {
            state: WorldState::default(),
            timestamp,
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.state.ledger
    }

    pub fn logs(&self) -> &[Log] {
        &self.state.logs
    }

    pub fn emit(&mut self, emitter: Address, event: EngineEvent) {
        debug!("Event {} from {:?}", event.name(), emitter);
        self.state.logs.push(Log { emitter, event });
    }

    /// Place a contract at `address`. Fails if the address is occupied.
    pub fn deploy(&mut self, address: Address, contract: Contract) -> ArbResult<()> {
        if self.state.contracts.contains_key(&address) {
            return Err(ArbError::AddressInUse(address));
        }
        debug!("Deployed {} at {:?}", contract.kind(), address);
        self.state.contracts.insert(address, contract);
        Ok(())
    }

    pub fn contract(&self, address: Address) -> Option<&Contract> {
        self.state.contracts.get(&address)
    }

    /// Record that `borrower` is about to request the loan identified by `key`
    pub fn open_flash_loan(&mut self, borrower: Address, key: B256) {
        debug!("Flash loan opened by {:?}: {}", borrower, key);
        self.state.pending_loans.insert(borrower, key);
    }

    /// Consume the pending loan of `borrower` if it matches `key`
    pub fn take_flash_loan(&mut self, borrower: Address, key: B256) -> bool {
        if self.state.pending_loans.get(&borrower) != Some(&key) {
            return false;
        }
        self.state.pending_loans.remove(&borrower);
        true
    }

    /// Run `f` as one indivisible transaction.
    ///
    /// On `Err` every state mutation made by `f` (balances, allowances,
    /// venue state, logs) is discarded before the error is returned.
    pub fn transact<T>(&mut self, f: impl FnOnce(&mut Chain) -> ArbResult<T>) -> ArbResult<T> {
        let checkpoint = self.state.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Transaction reverted: {}", e);
                self.state = checkpoint;
                Err(e)
            }
        }
    }

    // ── Typed contract accessors ────────────────────────────────────────

    pub fn pair_factory(&self, address: Address) -> ArbResult<&PairFactory> {
        match self.contract(address) {
            Some(Contract::PairFactory(factory)) => Ok(factory),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn pair_factory_mut(&mut self, address: Address) -> ArbResult<&mut PairFactory> {
        match self.state.contracts.get_mut(&address) {
            Some(Contract::PairFactory(factory)) => Ok(factory),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn pair_router(&self, address: Address) -> ArbResult<PairRouter> {
        match self.contract(address) {
            Some(Contract::PairRouter(router)) => Ok(*router),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn pool_factory(&self, address: Address) -> ArbResult<&PoolFactory> {
        match self.contract(address) {
            Some(Contract::PoolFactory(factory)) => Ok(factory),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn pool_factory_mut(&mut self, address: Address) -> ArbResult<&mut PoolFactory> {
        match self.state.contracts.get_mut(&address) {
            Some(Contract::PoolFactory(factory)) => Ok(factory),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn quoter(&self, address: Address) -> ArbResult<Quoter> {
        match self.contract(address) {
            Some(Contract::Quoter(quoter)) => Ok(*quoter),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn swap_router(&self, address: Address) -> ArbResult<SwapRouter> {
        match self.contract(address) {
            Some(Contract::SwapRouter(router)) => Ok(*router),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn balancer_vault(&self, address: Address) -> ArbResult<BalancerVault> {
        match self.contract(address) {
            Some(Contract::BalancerVault(vault)) => Ok(*vault),
            _ => Err(ArbError::NoContract(address)),
        }
    }

    pub fn aave_pool(&self, address: Address) -> ArbResult<AavePool> {
        match self.contract(address) {
            Some(Contract::AavePool(pool)) => Ok(*pool),
            _ => Err(ArbError::NoContract(address)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ReceivedETH;
    use alloy::primitives::U256;

    const TOKEN: Address = Address::repeat_byte(0x01);
    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    #[test]
    fn test_transact_commits_on_success() {
        let mut chain = Chain::new(1);
        chain.ledger_mut().mint(TOKEN, ALICE, U256::from(10)).unwrap();

        chain
            .transact(|c| c.ledger_mut().transfer(TOKEN, ALICE, BOB, U256::from(4)))
            .unwrap();

        assert_eq!(chain.ledger().balance_of(TOKEN, BOB), U256::from(4));
    }

    #[test]
    fn test_transact_rolls_back_everything_on_error() {
        let mut chain = Chain::new(1);
        chain.ledger_mut().mint(TOKEN, ALICE, U256::from(10)).unwrap();
        let before = chain.ledger().clone();

        let result: ArbResult<()> = chain.transact(|c| {
            c.ledger_mut().transfer(TOKEN, ALICE, BOB, U256::from(4))?;
            c.emit(
                ALICE,
                EngineEvent::ReceivedEth(ReceivedETH { from: BOB, amount: U256::from(1) }),
            );
            c.deploy(BOB, Contract::Quoter(Quoter::new(BOB, ALICE)))?;
            c.ledger_mut().transfer(TOKEN, ALICE, BOB, U256::from(100))
        });

        assert!(matches!(result, Err(ArbError::InsufficientBalance { .. })));
        assert_eq!(chain.ledger(), &before);
        assert!(chain.logs().is_empty());
        assert!(chain.contract(BOB).is_none());
    }

    #[test]
    fn test_flash_loan_marker_consumed_once() {
        let mut chain = Chain::new(1);
        let key = B256::repeat_byte(0x42);
        assert!(!chain.take_flash_loan(ALICE, key));

        chain.open_flash_loan(ALICE, key);
        assert!(!chain.take_flash_loan(BOB, key));
        assert!(!chain.take_flash_loan(ALICE, B256::repeat_byte(0x43)));
        assert!(chain.take_flash_loan(ALICE, key));
        assert!(!chain.take_flash_loan(ALICE, key));
    }

    #[test]
    fn test_flash_loan_marker_rolled_back() {
        let mut chain = Chain::new(1);
        let key = B256::repeat_byte(0x42);
        let result: ArbResult<()> = chain.transact(|c| {
            c.open_flash_loan(ALICE, key);
            Err(ArbError::InvalidAmount)
        });
        assert!(result.is_err());
        assert!(!chain.take_flash_loan(ALICE, key));
    }

    #[test]
    fn test_deploy_rejects_occupied_address() {
        let mut chain = Chain::new(1);
        chain.deploy(ALICE, Contract::Quoter(Quoter::new(ALICE, BOB))).unwrap();
        let err = chain.deploy(ALICE, Contract::Quoter(Quoter::new(ALICE, BOB))).unwrap_err();
        assert_eq!(err, ArbError::AddressInUse(ALICE));
    }

    #[test]
    fn test_wrong_contract_kind_is_no_contract() {
        let mut chain = Chain::new(1);
        chain.deploy(ALICE, Contract::Quoter(Quoter::new(ALICE, BOB))).unwrap();
        assert_eq!(chain.pair_router(ALICE).unwrap_err(), ArbError::NoContract(ALICE));
        assert!(chain.quoter(ALICE).is_ok());
    }
}
