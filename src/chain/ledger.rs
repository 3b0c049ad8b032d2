//! Token Ledger
//!
//! ERC-20 style balances/allowances plus native-currency balances for every
//! address in the simulated world.

use crate::error::{ArbError, ArbResult};
use alloy::primitives::{Address, U256};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// (token, holder) → balance
    balances: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) → allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    native: HashMap<Address, U256>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances.get(&(token, holder)).copied().unwrap_or(U256::ZERO)
    }

    /// Create `amount` of `token` out of thin air (world setup only)
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> ArbResult<()> {
        let balance = self.balances.entry((token, to)).or_insert(U256::ZERO);
        *balance = balance.checked_add(amount).ok_or(ArbError::Overflow)?;
        Ok(())
    }

    pub fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> ArbResult<()> {
        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(ArbError::InsufficientBalance { token, holder: from });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(ArbError::Overflow)?;
        self.balances.insert((token, from), from_balance - amount);
        self.balances.insert((token, to), to_balance);
        Ok(())
    }

    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((token, owner, spender), amount);
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Spend `spender`'s allowance over `from`'s tokens. Infinite (MAX) allowances are not decremented.
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> ArbResult<()> {
        let allowance = self.allowance(token, from, spender);
        if allowance < amount {
            return Err(ArbError::InsufficientAllowance { token, owner: from, spender });
        }
        self.transfer(token, from, to, amount)?;
        if allowance != U256::MAX {
            self.approve(token, from, spender, allowance - amount);
        }
        Ok(())
    }

    pub fn native_balance(&self, holder: Address) -> U256 {
        self.native.get(&holder).copied().unwrap_or(U256::ZERO)
    }

    pub fn credit_native(&mut self, to: Address, amount: U256) -> ArbResult<()> {
        let balance = self.native.entry(to).or_insert(U256::ZERO);
        *balance = balance.checked_add(amount).ok_or(ArbError::Overflow)?;
        Ok(())
    }

    pub fn transfer_native(&mut self, from: Address, to: Address, amount: U256) -> ArbResult<()> {
        let from_balance = self.native_balance(from);
        if from_balance < amount {
            return Err(ArbError::InsufficientBalance { token: Address::ZERO, holder: from });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        let to_balance = self
            .native_balance(to)
            .checked_add(amount)
            .ok_or(ArbError::Overflow)?;
        self.native.insert(from, from_balance - amount);
        self.native.insert(to, to_balance);
        Ok(())
    }
}
