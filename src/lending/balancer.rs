//! Balancer-style Vault
//!
//! Lends any mix of tokens it holds. Fee is a vault-wide percentage
//! (commonly zero), rounded up. After the callback the vault's balance of
//! every borrowed token must have grown by at least the fee.

use super::{FlashLoanRecipient, BPS_DENOMINATOR};
use crate::chain::Chain;
use crate::error::{ArbError, ArbResult};
use alloy::primitives::{Address, U256};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancerVault {
    pub address: Address,
    /// Flash loan fee in basis points
    pub fee_bps: u32,
}

impl BalancerVault {
    pub fn new(address: Address, fee_bps: u32) -> Self {
        Self { address, fee_bps }
    }

    pub fn flash_fee(&self, amount: U256) -> ArbResult<U256> {
        let scaled = amount
            .checked_mul(U256::from(self.fee_bps))
            .ok_or(ArbError::Overflow)?;
        let denominator = U256::from(BPS_DENOMINATOR);
        let fee = scaled / denominator;
        if (scaled % denominator).is_zero() {
            Ok(fee)
        } else {
            Ok(fee + U256::from(1))
        }
    }

    /// Lend `amounts` of `tokens` to `recipient_address`, invoke its callback,
    /// then verify repayment.
    pub fn flash_loan(
        &self,
        chain: &mut Chain,
        recipient_address: Address,
        recipient: &dyn FlashLoanRecipient,
        tokens: &[Address],
        amounts: &[U256],
        user_data: &[u8],
    ) -> ArbResult<()> {
        if tokens.len() != amounts.len() {
            return Err(ArbError::Provider("BAL#103 INPUT_LENGTH_MISMATCH".to_string()));
        }

        let mut fees = Vec::with_capacity(tokens.len());
        let mut pre_balances = Vec::with_capacity(tokens.len());
        for (token, amount) in tokens.iter().zip(amounts) {
            let pre = chain.ledger().balance_of(*token, self.address);
            if pre < *amount {
                return Err(ArbError::Provider("BAL#528 INSUFFICIENT_FLASH_LOAN_BALANCE".to_string()));
            }
            fees.push(self.flash_fee(*amount)?);
            pre_balances.push(pre);
            chain
                .ledger_mut()
                .transfer(*token, self.address, recipient_address, *amount)?;
        }

        debug!("Balancer flash loan: {} token(s) to {:?}", tokens.len(), recipient_address);
        recipient.receive_flash_loan(chain, self.address, tokens, amounts, &fees, user_data)?;

        for ((token, pre), fee) in tokens.iter().zip(&pre_balances).zip(&fees) {
            let post = chain.ledger().balance_of(*token, self.address);
            let required = pre.checked_add(*fee).ok_or(ArbError::Overflow)?;
            if post < required {
                return Err(ArbError::Provider("BAL#602 INVALID_POST_LOAN_BALANCE".to_string()));
            }
        }

        info!("Balancer flash loan repaid by {:?}", recipient_address);
        Ok(())
    }
}
