//! Amounts passed to burn and transfer operations.
//!
//! Raw token quantities are plain `u128` values. Burn and transfer additionally
//! accept a "everything" request that is resolved against the account's balance
//! only after interest has been settled, so the caller never has to predict
//! how much interest will be realized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested amount for a burn or transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferAmount {
    /// A fixed number of raw units.
    Exact(u128),
    /// The account's full balance after settlement.
    All,
}

impl TransferAmount {
    /// The integer sentinel that means "everything".
    pub const ALL_SENTINEL: u128 = u128::MAX;

    /// Resolve against a settled balance.
    pub fn resolve(self, settled_balance: u128) -> u128 {
        match self {
            Self::Exact(amount) => amount,
            Self::All => settled_balance,
        }
    }
}

impl From<u128> for TransferAmount {
    fn from(raw: u128) -> Self {
        if raw == Self::ALL_SENTINEL {
            Self::All
        } else {
            Self::Exact(raw)
        }
    }
}

impl fmt::Display for TransferAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(amount) => write!(f, "{}", amount),
            Self::All => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_maps_to_all() {
        assert_eq!(TransferAmount::from(u128::MAX), TransferAmount::All);
        assert_eq!(TransferAmount::from(7), TransferAmount::Exact(7));
    }

    #[test]
    fn resolve_uses_settled_balance_only_for_all() {
        assert_eq!(TransferAmount::All.resolve(42), 42);
        assert_eq!(TransferAmount::Exact(5).resolve(42), 5);
    }
}
