//! Storage-side collaborators of the accrual core.
//!
//! - [`BaseLedger`]: raw principal balances, total supply and allowances. The
//!   accrual engine never stores principal itself; it reads and mutates it
//!   only through this trait.
//! - [`AccrualStore`]: durable persistence of accrual bookkeeping.
//!
//! [`MemoryLedger`] is the in-process reference implementation of
//! [`BaseLedger`].

pub mod accrual;
pub mod error;
pub mod ledger;
pub mod memory;

pub use accrual::AccrualStore;
pub use error::{LedgerError, StoreError};
pub use ledger::BaseLedger;
pub use memory::MemoryLedger;
