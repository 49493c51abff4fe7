//! In-memory base ledger.

use std::collections::BTreeMap;

use crate::{BaseLedger, LedgerError};
use drip_types::AccountId;

/// A [`BaseLedger`] kept entirely in process memory.
///
/// Accounts are kept in a `BTreeMap` so snapshots iterate deterministically.
/// An allowance of `u128::MAX` is treated as unlimited and never decremented.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<AccountId, u128>,
    allowances: BTreeMap<(AccountId, AccountId), u128>,
    total_supply: u128,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn debit_checked(&self, account: &AccountId, amount: u128) -> Result<u128, LedgerError> {
        let available = self.raw_balance_of(account);
        available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            })
    }
}

impl BaseLedger for MemoryLedger {
    fn raw_balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn credit_principal(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .raw_balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(account.clone(), balance);
        Ok(())
    }

    fn debit_principal(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let remaining = self.debit_checked(account, amount)?;
        // Supply is the sum of balances, so it cannot underflow here.
        self.total_supply = self.total_supply.saturating_sub(amount);
        self.balances.insert(account.clone(), remaining);
        Ok(())
    }

    fn move_principal(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let remaining = self.debit_checked(from, amount)?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .raw_balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(from.clone(), remaining);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.allowance(owner, spender);
        if available == u128::MAX {
            return Ok(());
        }
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                needed: amount,
                available,
            })?;
        self.allowances
            .insert((owner.clone(), spender.clone()), remaining);
        Ok(())
    }

    fn accounts(&self) -> Vec<AccountId> {
        self.balances.keys().cloned().collect()
    }
}
