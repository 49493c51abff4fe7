//! Core accrual computation and settlement.
//!
//! `EffectiveBalance(a, t) = Principal(a) × (PRECISION + rate(a) × (t − last_sync(a))) / PRECISION`
//!
//! Growth is linear between settlements. Settling realizes the accrued amount
//! into principal and restarts the clock, so across settlements interest
//! compounds.

use crate::context::LedgerContext;
use crate::error::AccrualError;
use crate::journal::Journal;
use crate::state::AccrualBook;
use drip_store::BaseLedger;
use drip_types::{AccountId, Timestamp};

/// The outcome of settling one account at one instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub account: AccountId,
    /// Principal before interest was realized.
    pub previous_principal: u128,
    /// Interest realized into principal.
    pub increase: u128,
    /// Principal after settlement; equal to the effective balance at `at`.
    pub settled_principal: u128,
    pub at: Timestamp,
}

/// Stateless accrual rules; all state lives in the [`LedgerContext`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AccrualEngine;

impl AccrualEngine {
    /// Effective balance of `account` at `now`, computed on the fly.
    pub fn effective_balance<B: BaseLedger>(
        &self,
        ctx: &LedgerContext<B>,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        let principal = ctx.base.raw_balance_of(account);
        ctx.book.get(account).effective_balance(principal, now)
    }

    /// Work out what settling `account` at `now` would do, without doing it.
    pub fn plan_settlement<B: BaseLedger>(
        &self,
        ctx: &LedgerContext<B>,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<Settlement, AccrualError> {
        let previous_principal = ctx.base.raw_balance_of(account);
        let effective = ctx
            .book
            .get(account)
            .effective_balance(previous_principal, now)?;
        let increase = effective.checked_sub(previous_principal).ok_or_else(|| {
            AccrualError::InvariantViolation(format!(
                "negative accrual for {}: principal {}, effective {}",
                account, previous_principal, effective
            ))
        })?;
        Ok(Settlement {
            account: account.clone(),
            previous_principal,
            increase,
            settled_principal: effective,
            at: now,
        })
    }

    /// Realize accrued interest for `account` and restart its accrual clock.
    ///
    /// Idempotent at a fixed `now`: the second call realizes zero.
    pub fn settle<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<Settlement, AccrualError> {
        let settlement = self.plan_settlement(ctx, account, now)?;
        Journal::atomically(&mut ctx.base, |j| {
            j.credit(&settlement.account, settlement.increase)
        })?;
        self.stamp(&mut ctx.book, &settlement);
        tracing::debug!(
            account = %settlement.account,
            increase = settlement.increase,
            at = %now,
            "settled"
        );
        Ok(settlement)
    }

    /// Advance the account's last-sync to the settlement instant, keeping its rate.
    pub(crate) fn stamp(&self, book: &mut AccrualBook, settlement: &Settlement) {
        let mut accrual = book.get(&settlement.account);
        accrual.last_sync = settlement.at;
        book.insert(settlement.account.clone(), accrual);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AccountAccrual;
    use drip_store::MemoryLedger;
    use drip_types::{Rate, PRECISION};

    fn id(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn funded(principal: u128, rate: Rate, at: u64) -> (LedgerContext<MemoryLedger>, AccountId) {
        let alice = id("alice");
        let mut ctx = LedgerContext::new(MemoryLedger::new(), rate, Timestamp::new(0));
        ctx.base.credit_principal(&alice, principal).unwrap();
        ctx.book
            .insert(alice.clone(), AccountAccrual::new(rate, Timestamp::new(at)));
        (ctx, alice)
    }

    #[test]
    fn settle_realizes_interest_into_principal() {
        let (mut ctx, alice) = funded(10, Rate::from_raw(PRECISION / 2), 0);
        let s = AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(2)).unwrap();
        assert_eq!(s.previous_principal, 10);
        assert_eq!(s.increase, 10);
        assert_eq!(s.settled_principal, 20);
        assert_eq!(ctx.principal_balance_of(&alice), 20);
        assert_eq!(ctx.last_sync_of(&alice), Some(Timestamp::new(2)));
        assert_eq!(ctx.total_principal(), 20);
    }

    #[test]
    fn settle_twice_at_same_time_is_noop() {
        let (mut ctx, alice) = funded(10, Rate::from_raw(PRECISION / 2), 0);
        AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(2)).unwrap();
        let second = AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(2)).unwrap();
        assert_eq!(second.increase, 0);
        assert_eq!(ctx.principal_balance_of(&alice), 20);
    }

    #[test]
    fn settlement_restarts_linear_growth_from_new_principal() {
        let (mut ctx, alice) = funded(10, Rate::from_raw(PRECISION / 2), 0);
        AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(2)).unwrap();
        // 20 principal at 50%/s for 2 more seconds.
        assert_eq!(ctx.effective_balance_of(&alice, Timestamp::new(4)).unwrap(), 40);
    }

    #[test]
    fn settle_with_zero_increase_still_stamps_clock() {
        let (mut ctx, alice) = funded(10, Rate::ZERO, 0);
        let s = AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(50)).unwrap();
        assert_eq!(s.increase, 0);
        assert_eq!(ctx.last_sync_of(&alice), Some(Timestamp::new(50)));
    }

    #[test]
    fn settle_unknown_account_only_stamps_clock() {
        let mut ctx = LedgerContext::new(MemoryLedger::new(), Rate::ONE, Timestamp::new(0));
        let bob = id("bob");
        let s = AccrualEngine.settle(&mut ctx, &bob, Timestamp::new(9)).unwrap();
        assert_eq!(s.increase, 0);
        assert_eq!(ctx.account_rate(&bob), Rate::ZERO);
        assert_eq!(ctx.last_sync_of(&bob), Some(Timestamp::new(9)));
    }

    #[test]
    fn backward_clock_aborts_settlement() {
        let (mut ctx, alice) = funded(10, Rate::ONE, 100);
        let err = AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(99)).unwrap_err();
        assert!(matches!(err, AccrualError::InvariantViolation(_)));
        assert_eq!(ctx.principal_balance_of(&alice), 10);
        assert_eq!(ctx.last_sync_of(&alice), Some(Timestamp::new(100)));
    }

    #[test]
    fn overflowing_accrual_is_rejected_without_mutation() {
        let (mut ctx, alice) = funded(u128::MAX / 2, Rate::ONE, 0);
        let err = AccrualEngine.settle(&mut ctx, &alice, Timestamp::new(3)).unwrap_err();
        assert_eq!(err, AccrualError::Overflow);
        assert_eq!(ctx.principal_balance_of(&alice), u128::MAX / 2);
        assert_eq!(ctx.last_sync_of(&alice), Some(Timestamp::new(0)));
    }

    #[test]
    fn effective_balance_read_does_not_mutate() {
        let (ctx, alice) = funded(10, Rate::ONE, 0);
        assert_eq!(
            AccrualEngine.effective_balance(&ctx, &alice, Timestamp::new(5)).unwrap(),
            60
        );
        assert_eq!(ctx.principal_balance_of(&alice), 10);
        assert_eq!(ctx.last_sync_of(&alice), Some(Timestamp::new(0)));
    }
}
