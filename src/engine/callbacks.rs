//! Provider callback entry points
//!
//! Each provider has its own identity convention, checked before anything
//! else. Aave reports the initiator; for Balancer the engine matches the
//! callback against the loan it opened in `execute_flash_swap`. Both then
//! decode the route and share `FlashSwapEngine::run_route`.

use super::{flash_loan_key, FlashSwapEngine};
use crate::chain::Chain;
use crate::error::{
    ArbError, ArbResult, INVALID_INITIATOR, INVALID_POOL_ADDRESS, INVALID_VAULT_ADDRESS, UNSOLICITED_FLASH_LOAN,
};
use crate::lending::{FlashLoanRecipient, FlashLoanSimpleReceiver};
use crate::types::{ArbitrageRoute, LoanContext, ProviderId};
use alloy::primitives::{Address, U256};
use tracing::{info, warn};

impl FlashLoanRecipient for FlashSwapEngine {
    fn receive_flash_loan(
        &self,
        chain: &mut Chain,
        sender: Address,
        tokens: &[Address],
        amounts: &[U256],
        fee_amounts: &[U256],
        user_data: &[u8],
    ) -> ArbResult<()> {
        if sender != self.config.balancer_vault {
            warn!("receiveFlashLoan from unexpected sender {:?}", sender);
            return Err(ArbError::UnauthorizedCallback(INVALID_VAULT_ADDRESS));
        }
        let (token, amount, fee) = match (tokens, amounts, fee_amounts) {
            ([token], [amount], [fee]) => (*token, *amount, *fee),
            _ => return Err(ArbError::InvalidCallbackParams),
        };
        if !chain.take_flash_loan(self.config.address, flash_loan_key(token, amount, user_data)) {
            warn!("receiveFlashLoan without a matching request: {} of {:?}", amount, token);
            return Err(ArbError::UnauthorizedCallback(UNSOLICITED_FLASH_LOAN));
        }

        let route = ArbitrageRoute::decode(user_data)?;
        let loan = LoanContext {
            borrowed_token: token,
            borrowed_amount: amount,
            fee,
            provider: ProviderId::Balancer,
        };
        let repayment = self.run_route(chain, &route, loan)?;

        chain
            .ledger_mut()
            .transfer(token, self.config.address, sender, repayment)?;
        info!("Repaid Balancer vault: {}", repayment);
        Ok(())
    }
}

impl FlashLoanSimpleReceiver for FlashSwapEngine {
    fn execute_operation(
        &self,
        chain: &mut Chain,
        sender: Address,
        asset: Address,
        amount: U256,
        premium: U256,
        initiator: Address,
        params: &[u8],
    ) -> ArbResult<bool> {
        if sender != self.config.aave_pool {
            warn!("executeOperation from unexpected sender {:?}", sender);
            return Err(ArbError::UnauthorizedCallback(INVALID_POOL_ADDRESS));
        }
        if initiator != self.config.address {
            warn!("executeOperation for foreign initiator {:?}", initiator);
            return Err(ArbError::UnauthorizedCallback(INVALID_INITIATOR));
        }

        let route = ArbitrageRoute::decode(params)?;
        let loan = LoanContext {
            borrowed_token: asset,
            borrowed_amount: amount,
            fee: premium,
            provider: ProviderId::Aave,
        };
        let repayment = self.run_route(chain, &route, loan)?;

        // Pool pulls the repayment after we return
        chain
            .ledger_mut()
            .approve(asset, self.config.address, sender, repayment);
        info!("Approved Aave pool for repayment: {}", repayment);
        Ok(true)
    }
}
