//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the ledger (the clock, the base ledger and durable
//! storage) sit behind traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod store;

pub use clock::NullClock;
pub use ledger::FlakyLedger;
pub use store::NullAccrualStore;
