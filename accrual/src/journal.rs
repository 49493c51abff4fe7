//! Undo journal for base-ledger mutations.
//!
//! An operation may touch the base ledger several times (realize interest for
//! two accounts, spend an allowance, move principal). If any step fails, every
//! earlier step is reverted in reverse order so the operation leaves no trace.
//! If a reverting step itself fails the ledger is left half-applied, and the
//! operation fails with [`AccrualError::InvariantViolation`] instead of the
//! original, recoverable error.

use crate::error::AccrualError;
use drip_store::BaseLedger;
use drip_types::AccountId;

enum Undo {
    Credit {
        account: AccountId,
        amount: u128,
    },
    Debit {
        account: AccountId,
        amount: u128,
    },
    Move {
        from: AccountId,
        to: AccountId,
        amount: u128,
    },
    Allowance {
        owner: AccountId,
        spender: AccountId,
        previous: u128,
    },
}

impl Undo {
    fn describe(&self) -> String {
        match self {
            Undo::Credit { account, amount } => format!("reverting credit of {amount} to {account}"),
            Undo::Debit { account, amount } => format!("reverting debit of {amount} from {account}"),
            Undo::Move { from, to, amount } => {
                format!("reverting move of {amount} from {from} to {to}")
            }
            Undo::Allowance { owner, spender, .. } => {
                format!("restoring allowance of {spender} over {owner}")
            }
        }
    }
}

pub(crate) struct Journal<'a, B: BaseLedger> {
    base: &'a mut B,
    undo: Vec<Undo>,
}

impl<'a, B: BaseLedger> Journal<'a, B> {
    /// Run `steps` against `base`; on error, revert whatever already applied.
    ///
    /// Returns the error from `steps` when the revert succeeded, or an
    /// `InvariantViolation` naming the failed compensation when it did not.
    pub(crate) fn atomically<F>(base: &'a mut B, steps: F) -> Result<(), AccrualError>
    where
        F: FnOnce(&mut Journal<'a, B>) -> Result<(), AccrualError>,
    {
        let mut journal = Journal {
            base,
            undo: Vec::new(),
        };
        match steps(&mut journal) {
            Ok(()) => Ok(()),
            Err(e) => match journal.rollback() {
                Ok(()) => Err(e),
                Err(fatal) => Err(fatal),
            },
        }
    }

    pub(crate) fn credit(&mut self, account: &AccountId, amount: u128) -> Result<(), AccrualError> {
        if amount == 0 {
            return Ok(());
        }
        self.base.credit_principal(account, amount)?;
        self.undo.push(Undo::Credit {
            account: account.clone(),
            amount,
        });
        Ok(())
    }

    pub(crate) fn debit(&mut self, account: &AccountId, amount: u128) -> Result<(), AccrualError> {
        if amount == 0 {
            return Ok(());
        }
        self.base.debit_principal(account, amount)?;
        self.undo.push(Undo::Debit {
            account: account.clone(),
            amount,
        });
        Ok(())
    }

    pub(crate) fn move_principal(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), AccrualError> {
        self.base.move_principal(from, to, amount)?;
        self.undo.push(Undo::Move {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    pub(crate) fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), AccrualError> {
        let previous = self.base.allowance(owner, spender);
        self.base.spend_allowance(owner, spender, amount)?;
        self.undo.push(Undo::Allowance {
            owner: owner.clone(),
            spender: spender.clone(),
            previous,
        });
        Ok(())
    }

    fn rollback(mut self) -> Result<(), AccrualError> {
        while let Some(step) = self.undo.pop() {
            let result = match &step {
                Undo::Credit { account, amount } => self.base.debit_principal(account, *amount),
                Undo::Debit { account, amount } => self.base.credit_principal(account, *amount),
                Undo::Move { from, to, amount } => self.base.move_principal(to, from, *amount),
                Undo::Allowance {
                    owner,
                    spender,
                    previous,
                } => self.base.approve(owner, spender, *previous),
            };
            if let Err(e) = result {
                tracing::error!(
                    error = %e,
                    compensation = step.describe(),
                    pending = self.undo.len(),
                    "base ledger rollback step failed"
                );
                return Err(AccrualError::InvariantViolation(format!(
                    "rollback failed while {}: {}",
                    step.describe(),
                    e
                )));
            }
        }
        Ok(())
    }
}
