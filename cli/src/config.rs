//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use drip_accrual::{AccrualError, LedgerContext, Role, RoleTable, TransferCoordinator};
use drip_store::MemoryLedger;
use drip_types::{AccountId, Rate, RateParseError, Timestamp};
use drip_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(String),

    #[error("cannot parse config: {0}")]
    Parse(String),

    #[error("invalid initial_global_rate: {0}")]
    InvalidRate(#[from] RateParseError),

    #[error("invalid account identifier {0:?}")]
    InvalidAccount(String),

    #[error("role setup failed: {0}")]
    Roles(#[from] AccrualError),
}

/// Configuration for a DRIP ledger instance.
///
/// Loaded from TOML via [`LedgerConfig::from_toml_file`]; every field has a
/// default so an empty file is valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Starting global rate as a decimal fraction per second, e.g. "0.000001".
    #[serde(default = "default_initial_rate")]
    pub initial_global_rate: String,

    /// Unix seconds at which the initial rate takes effect.
    #[serde(default)]
    pub genesis: u64,

    /// The only account allowed to lower the global rate.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Accounts granted the mint/burn role at startup.
    #[serde(default)]
    pub minters: Vec<String>,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_initial_rate() -> String {
    "0.000001".to_string()
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LedgerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn initial_rate(&self) -> Result<Rate, ConfigError> {
        Ok(self.initial_global_rate.parse()?)
    }

    /// Check every field that can be wrong without touching a ledger.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.initial_rate()?;
        for name in std::iter::once(&self.owner).chain(&self.minters) {
            if !AccountId::new(name.as_str()).is_valid() {
                return Err(ConfigError::InvalidAccount(name.clone()));
            }
        }
        Ok(())
    }

    /// Build an empty in-memory ledger and a coordinator with the configured roles.
    pub fn build_ledger(
        &self,
    ) -> Result<(LedgerContext<MemoryLedger>, TransferCoordinator<RoleTable>), ConfigError> {
        self.validate()?;
        let owner = AccountId::new(self.owner.as_str());
        let mut roles = RoleTable::new(owner.clone());
        for minter in &self.minters {
            roles.grant_role(&owner, Role::MintBurn, AccountId::new(minter.as_str()))?;
        }
        let ctx = LedgerContext::new(
            MemoryLedger::new(),
            self.initial_rate()?,
            Timestamp::new(self.genesis),
        );
        Ok((ctx, TransferCoordinator::new(roles)))
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_global_rate: default_initial_rate(),
            genesis: 0,
            owner: default_owner(),
            minters: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
