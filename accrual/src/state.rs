//! Per-account accrual state.

use std::collections::HashMap;

use crate::error::AccrualError;
use drip_types::{mul_div_precision, AccountId, Rate, Timestamp, PRECISION};
use serde::{Deserialize, Serialize};

/// Accrual bookkeeping for a single account.
///
/// Principal lives in the base ledger; this only records how fast that
/// principal grows and since when. Accounts that were never funded use the
/// default: rate zero, last synced at the epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAccrual {
    /// Rate snapshot taken when the account was last funded from empty.
    pub rate: Rate,
    /// When interest was last realized into principal.
    pub last_sync: Timestamp,
}

impl AccountAccrual {
    pub fn new(rate: Rate, last_sync: Timestamp) -> Self {
        Self { rate, last_sync }
    }

    /// Seconds since the last settlement. A clock that moved backward is an
    /// invariant violation, never a zero.
    pub fn elapsed(&self, now: Timestamp) -> Result<u64, AccrualError> {
        self.last_sync.checked_elapsed_since(now).ok_or_else(|| {
            AccrualError::InvariantViolation(format!(
                "clock moved backward: last sync {}, now {}",
                self.last_sync, now
            ))
        })
    }

    /// `rate × elapsed`, the linear growth since last settlement (scaled).
    fn growth(&self, now: Timestamp) -> Result<u128, AccrualError> {
        let elapsed = self.elapsed(now)?;
        self.rate
            .raw()
            .checked_mul(elapsed as u128)
            .ok_or(AccrualError::Overflow)
    }

    /// `PRECISION + rate × elapsed`.
    pub fn accrual_factor(&self, now: Timestamp) -> Result<u128, AccrualError> {
        PRECISION
            .checked_add(self.growth(now)?)
            .ok_or(AccrualError::Overflow)
    }

    /// `principal × factor / PRECISION`, rounded down.
    ///
    /// Evaluated as `principal + principal × growth / PRECISION`, which is the
    /// same floor but keeps the intermediate product inside 128 bits.
    pub fn effective_balance(&self, principal: u128, now: Timestamp) -> Result<u128, AccrualError> {
        let growth = self.growth(now)?;
        let interest = mul_div_precision(principal, growth).ok_or(AccrualError::Overflow)?;
        principal
            .checked_add(interest)
            .ok_or(AccrualError::Overflow)
    }
}

/// Accrual records for every account the ledger has touched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccrualBook {
    accounts: HashMap<AccountId, AccountAccrual>,
}

impl AccrualBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `account`, or the never-funded default.
    pub fn get(&self, account: &AccountId) -> AccountAccrual {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// The stored record, if the account has ever been settled.
    pub fn record(&self, account: &AccountId) -> Option<&AccountAccrual> {
        self.accounts.get(account)
    }

    pub fn insert(&mut self, account: AccountId, accrual: AccountAccrual) {
        self.accounts.insert(account, accrual);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &AccountAccrual)> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
