//! Accrual engine for the DRIP ledger.
//!
//! Every account holds principal (in the base ledger) plus a personal rate
//! snapshot taken when it was funded from empty. Its effective balance grows
//! linearly from the last settlement:
//!
//! `effective = principal × (PRECISION + rate × (now − last_sync)) / PRECISION`
//!
//! This crate handles:
//! - Effective-balance computation and settlement (realizing interest)
//! - The global rate registry (the rate may only decrease)
//! - Coordinating mint, burn, transfer and transfer-from around settlement
//! - Atomicity: a failed operation leaves no partial state behind
//! - Persistence of accrual bookkeeping

pub mod access;
pub mod context;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod event;
mod journal;
pub mod registry;
pub mod shared;
pub mod state;

pub use access::{Authorizer, Permission, Role, RoleTable};
pub use context::LedgerContext;
pub use coordinator::TransferCoordinator;
pub use engine::{AccrualEngine, Settlement};
pub use error::AccrualError;
pub use event::{EventBus, LedgerEvent};
pub use registry::{RateRegistry, RateSegment};
pub use shared::SharedLedger;
pub use state::{AccountAccrual, AccrualBook};
