//! Fundamental types for the DRIP accrual ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, fixed-point rates, transfer amounts, timestamps and the clock seam.

pub mod account;
pub mod amount;
pub mod rate;
pub mod time;

pub use account::AccountId;
pub use amount::TransferAmount;
pub use rate::{mul_div_precision, Rate, RateParseError, PRECISION};
pub use time::{Clock, SystemClock, Timestamp};
