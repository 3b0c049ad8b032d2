//! Aave-style Pool (flashLoanSimple)
//!
//! Single-asset loans with a protocol-wide premium in basis points. The
//! receiver must return `true` and leave an allowance for the pool to pull
//! `amount + premium`.

use super::{FlashLoanSimpleReceiver, BPS_DENOMINATOR};
use crate::chain::Chain;
use crate::error::{ArbError, ArbResult};
use alloy::primitives::{Address, U256};
use tracing::{debug, info};

/// Aave V3 default flash loan premium (0.05%)
pub const DEFAULT_PREMIUM_BPS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AavePool {
    pub address: Address,
    pub premium_bps: u32,
}

impl AavePool {
    pub fn new(address: Address, premium_bps: u32) -> Self {
        Self { address, premium_bps }
    }

    /// percentMul with half-up rounding
    pub fn premium(&self, amount: U256) -> ArbResult<U256> {
        let scaled = amount
            .checked_mul(U256::from(self.premium_bps))
            .and_then(|v| v.checked_add(U256::from(BPS_DENOMINATOR / 2)))
            .ok_or(ArbError::Overflow)?;
        Ok(scaled / U256::from(BPS_DENOMINATOR))
    }

    /// Lend `amount` of `asset` to `receiver_address`. `initiator` is the
    /// account that requested the loan and is forwarded to the callback.
    #[allow(clippy::too_many_arguments)]
    pub fn flash_loan_simple(
        &self,
        chain: &mut Chain,
        initiator: Address,
        receiver_address: Address,
        receiver: &dyn FlashLoanSimpleReceiver,
        asset: Address,
        amount: U256,
        params: &[u8],
    ) -> ArbResult<()> {
        if amount.is_zero() {
            return Err(ArbError::Provider("INVALID_AMOUNT".to_string()));
        }
        if chain.ledger().balance_of(asset, self.address) < amount {
            return Err(ArbError::Provider("INSUFFICIENT_LIQUIDITY".to_string()));
        }

        let premium = self.premium(amount)?;
        chain
            .ledger_mut()
            .transfer(asset, self.address, receiver_address, amount)?;

        debug!("Aave flash loan: {} of {:?} to {:?} (premium {})", amount, asset, receiver_address, premium);
        let ok = receiver.execute_operation(chain, self.address, asset, amount, premium, initiator, params)?;
        if !ok {
            return Err(ArbError::Provider("INVALID_FLASHLOAN_EXECUTOR_RETURN".to_string()));
        }

        let total = amount.checked_add(premium).ok_or(ArbError::Overflow)?;
        chain
            .ledger_mut()
            .transfer_from(asset, self.address, receiver_address, self.address, total)?;

        info!("Aave flash loan repaid by {:?}: {} + {}", receiver_address, amount, premium);
        Ok(())
    }
}
