//! Accrual-specific errors.

use crate::access::Permission;
use drip_store::{LedgerError, StoreError};
use drip_types::{AccountId, Rate};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccrualError {
    /// Internal bookkeeping is inconsistent; the operation is aborted.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("global rate may only decrease: current {current}, attempted {attempted}")]
    RateIncreaseRejected { current: Rate, attempted: Rate },

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, available {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("{caller} is not authorized (requires {required})")]
    Unauthorized { caller: AccountId, required: Permission },

    #[error("arithmetic overflow in accrual computation")]
    Overflow,

    #[error("base ledger error: {0}")]
    Ledger(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<LedgerError> for AccrualError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance { needed, available } => {
                Self::InsufficientBalance { needed, available }
            }
            LedgerError::InsufficientAllowance { needed, available } => {
                Self::InsufficientAllowance { needed, available }
            }
            LedgerError::Overflow => Self::Overflow,
            LedgerError::Backend(msg) => Self::Ledger(msg),
        }
    }
}

impl From<StoreError> for AccrualError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}
