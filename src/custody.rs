//! Engine custody: native currency and token balances held by the engine.
//!
//! Anyone may send native currency in. Withdrawals and balance queries are
//! owner-only; withdrawals always go to the owner.

use crate::chain::Chain;
use crate::contracts::{ReceivedETH, WithdrawETH, WithdrawnTokens};
use crate::engine::FlashSwapEngine;
use crate::error::ArbResult;
use crate::events::EngineEvent;
use alloy::primitives::{Address, U256};
use tracing::info;

impl FlashSwapEngine {
    /// Native currency sent to the engine
    pub fn receive(&self, chain: &mut Chain, from: Address, amount: U256) -> ArbResult<()> {
        chain.transact(|chain| {
            chain.ledger_mut().transfer_native(from, self.address(), amount)?;
            chain.emit(self.address(), EngineEvent::ReceivedEth(ReceivedETH { from, amount }));
            Ok(())
        })
    }

    pub fn withdraw(&self, chain: &mut Chain, caller: Address, amount: U256) -> ArbResult<()> {
        self.only_owner(caller)?;
        let owner = self.owner();
        chain.transact(|chain| {
            chain.ledger_mut().transfer_native(self.address(), owner, amount)?;
            chain.emit(self.address(), EngineEvent::WithdrawEth(WithdrawETH { to: owner, amount }));
            info!("Withdrew {} native to {:?}", amount, owner);
            Ok(())
        })
    }

    pub fn withdraw_tokens(&self, chain: &mut Chain, caller: Address, token: Address, amount: U256) -> ArbResult<()> {
        self.only_owner(caller)?;
        let owner = self.owner();
        chain.transact(|chain| {
            chain.ledger_mut().transfer(token, self.address(), owner, amount)?;
            chain.emit(
                self.address(),
                EngineEvent::WithdrawnTokens(WithdrawnTokens { token, to: owner, amount }),
            );
            info!("Withdrew {} of {:?} to {:?}", amount, token, owner);
            Ok(())
        })
    }

    pub fn get_balance(&self, chain: &Chain, caller: Address) -> ArbResult<U256> {
        self.only_owner(caller)?;
        Ok(chain.ledger().native_balance(self.address()))
    }

    pub fn get_token_balance(&self, chain: &Chain, caller: Address, token: Address) -> ArbResult<U256> {
        self.only_owner(caller)?;
        Ok(chain.ledger().balance_of(token, self.address()))
    }
}
