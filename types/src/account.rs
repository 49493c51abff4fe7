//! Account identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one ledger account.
///
/// The ledger treats identifiers as opaque; the host decides what they encode
/// (a public key, a username, a contract address).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An identifier is well-formed when it is non-empty and has no surrounding whitespace.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.trim() == self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(AccountId::new("alice").is_valid());
        assert!(!AccountId::new("").is_valid());
        assert!(!AccountId::new(" bob").is_valid());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![AccountId::from("carol"), AccountId::from("alice"), AccountId::from("bob")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "alice");
        assert_eq!(ids[2].to_string(), "carol");
    }
}
