//! Nullable base ledger: an in-memory ledger whose writes can be made to fail.

use drip_store::{BaseLedger, LedgerError, MemoryLedger};
use drip_types::AccountId;

/// A [`MemoryLedger`] with a write budget.
///
/// Reads always succeed. Once the budget set by [`FlakyLedger::fail_after`]
/// is spent, every write fails with [`LedgerError::Backend`] and changes
/// nothing, which lets tests break an operation (or its rollback) midway.
#[derive(Clone, Debug, Default)]
pub struct FlakyLedger {
    inner: MemoryLedger,
    writes_left: Option<usize>,
}

impl FlakyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `writes` more successful writes, then fail every one after.
    pub fn fail_after(&mut self, writes: usize) {
        self.writes_left = Some(writes);
    }

    /// Remove the write budget.
    pub fn heal(&mut self) {
        self.writes_left = None;
    }

    fn take_write(&mut self) -> Result<(), LedgerError> {
        match &mut self.writes_left {
            Some(0) => Err(LedgerError::Backend("ledger unavailable".into())),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl BaseLedger for FlakyLedger {
    fn raw_balance_of(&self, account: &AccountId) -> u128 {
        self.inner.raw_balance_of(account)
    }

    fn total_supply(&self) -> u128 {
        self.inner.total_supply()
    }

    fn credit_principal(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.take_write()?;
        self.inner.credit_principal(account, amount)
    }

    fn debit_principal(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.take_write()?;
        self.inner.debit_principal(account, amount)
    }

    fn move_principal(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.take_write()?;
        self.inner.move_principal(from, to, amount)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.inner.allowance(owner, spender)
    }

    fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.take_write()?;
        self.inner.approve(owner, spender, amount)
    }

    fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.take_write()?;
        self.inner.spend_allowance(owner, spender, amount)
    }

    fn accounts(&self) -> Vec<AccountId> {
        self.inner.accounts()
    }
}
