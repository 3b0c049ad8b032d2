//! Flash Loan Providers
//!
//! Two structurally different lenders with their own callback contracts:
//! - Balancer-style vault: multi-token loan, `receiveFlashLoan` callback,
//!   recipient transfers the repayment back
//! - Aave-style pool: single-asset loan, `executeOperation` callback with an
//!   explicit initiator, pool pulls the repayment via allowance
//!
//! Providers pass their own address as `sender` so receivers can check who
//! is calling them.

pub mod aave;
pub mod balancer;

pub use aave::{AavePool, DEFAULT_PREMIUM_BPS};
pub use balancer::BalancerVault;

use crate::chain::Chain;
use crate::error::ArbResult;
use alloy::primitives::{Address, U256};

/// Balancer `IFlashLoanRecipient`
pub trait FlashLoanRecipient {
    fn receive_flash_loan(
        &self,
        chain: &mut Chain,
        sender: Address,
        tokens: &[Address],
        amounts: &[U256],
        fee_amounts: &[U256],
        user_data: &[u8],
    ) -> ArbResult<()>;
}

/// Aave `IFlashLoanSimpleReceiver`
pub trait FlashLoanSimpleReceiver {
    #[allow(clippy::too_many_arguments)]
    fn execute_operation(
        &self,
        chain: &mut Chain,
        sender: Address,
        asset: Address,
        amount: U256,
        premium: U256,
        initiator: Address,
        params: &[u8],
    ) -> ArbResult<bool>;
}

const BPS_DENOMINATOR: u64 = 10_000;
