//! Shared utilities for the DRIP accrual ledger.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat, LogFormatParseError};
pub use time::format_duration;
