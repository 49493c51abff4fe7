use thiserror::Error;

/// Failures raised by a [`crate::BaseLedger`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient principal: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, available {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("arithmetic overflow in base ledger")]
    Overflow,

    #[error("base ledger backend error: {0}")]
    Backend(String),
}

/// Failures raised by an [`crate::AccrualStore`] or while encoding its records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
