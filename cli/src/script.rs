//! Operation scripts: a JSON list of timestamped ledger operations replayed
//! against an in-memory ledger, followed by a balance report.
//!
//! ```json
//! {
//!   "report_at": 2,
//!   "steps": [
//!     { "at": 0, "op": "mint", "caller": "treasury", "to": "x", "amount": "10", "rate": "0.5" },
//!     { "at": 2, "op": "transfer", "from": "x", "to": "y", "amount": "all" }
//!   ]
//! }
//! ```
//!
//! Amounts are decimal strings of base units, or `"all"`. Rates are decimal
//! fractions per second.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use drip_accrual::{AccrualError, LedgerContext, LedgerEvent, RoleTable, TransferCoordinator};
use drip_store::{BaseLedger, MemoryLedger};
use drip_types::{AccountId, Rate, RateParseError, Timestamp, TransferAmount};
use drip_utils::format_duration;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script: {0}")]
    Io(String),

    #[error("cannot parse script: {0}")]
    Parse(String),

    #[error("step {index} ({op}) failed: {source}")]
    StepFailed {
        index: usize,
        op: &'static str,
        source: AccrualError,
    },

    #[error("cannot build report: {0}")]
    Report(AccrualError),
}

/// A base-unit amount, or the whole settled balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct AmountArg(pub TransferAmount);

impl TryFrom<String> for AmountArg {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self(TransferAmount::All));
        }
        s.parse::<u128>()
            .map(|v| Self(TransferAmount::Exact(v)))
            .map_err(|e| format!("invalid amount {s:?}: {e}"))
    }
}

/// A concrete base-unit amount; `"all"` is not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct UnitsArg(pub u128);

impl TryFrom<String> for UnitsArg {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|e| format!("invalid amount {s:?}: {e}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct RateArg(pub Rate);

impl TryFrom<String> for RateArg {
    type Error = RateParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map(Self)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Mint at `rate`, or at the global rate when omitted.
    Mint {
        caller: AccountId,
        to: AccountId,
        amount: UnitsArg,
        #[serde(default)]
        rate: Option<RateArg>,
    },
    Burn {
        caller: AccountId,
        from: AccountId,
        amount: AmountArg,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: AmountArg,
    },
    TransferFrom {
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: AmountArg,
    },
    Approve {
        owner: AccountId,
        spender: AccountId,
        amount: AmountArg,
    },
    SetGlobalRate {
        caller: AccountId,
        rate: RateArg,
    },
    Settle {
        account: AccountId,
    },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Mint { .. } => "mint",
            Op::Burn { .. } => "burn",
            Op::Transfer { .. } => "transfer",
            Op::TransferFrom { .. } => "transfer_from",
            Op::Approve { .. } => "approve",
            Op::SetGlobalRate { .. } => "set_global_rate",
            Op::Settle { .. } => "settle",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    /// Unix seconds at which the operation executes.
    pub at: u64,
    #[serde(flatten)]
    pub op: Op,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Script {
    /// When balances are reported; defaults to the last step's time.
    #[serde(default)]
    pub report_at: Option<u64>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScriptError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(s).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    fn report_time(&self) -> u64 {
        self.report_at
            .or_else(|| self.steps.iter().map(|s| s.at).max())
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub at: u64,
    pub op: &'static str,
    /// Amount actually moved or burned, once `all` is resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AccountReport {
    pub account: AccountId,
    pub principal: u128,
    pub effective: u128,
    pub rate: String,
    pub last_sync: Option<u64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub report_at: u64,
    /// Human-readable time covered by the script.
    pub span: String,
    pub global_rate: String,
    pub total_principal: u128,
    pub steps: Vec<StepOutcome>,
    pub accounts: Vec<AccountReport>,
    pub events: Vec<LedgerEvent>,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| s.error.is_some()).count()
    }
}

pub struct ScriptRunner {
    ctx: LedgerContext<MemoryLedger>,
    coordinator: TransferCoordinator<RoleTable>,
    events: Arc<Mutex<Vec<LedgerEvent>>>,
    fail_fast: bool,
}

impl ScriptRunner {
    pub fn new(
        ctx: LedgerContext<MemoryLedger>,
        mut coordinator: TransferCoordinator<RoleTable>,
    ) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        coordinator.subscribe(Box::new(move |event: &LedgerEvent| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(event.clone());
            }
        }));
        Self {
            ctx,
            coordinator,
            events,
            fail_fast: false,
        }
    }

    /// Stop at the first failing step instead of recording it and moving on.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn run(mut self, script: &Script) -> Result<Report, ScriptError> {
        let mut steps = Vec::with_capacity(script.steps.len());
        for (index, step) in script.steps.iter().enumerate() {
            let op = step.op.name();
            match self.apply(step) {
                Ok(amount) => {
                    tracing::debug!(index, op, at = step.at, "step applied");
                    steps.push(StepOutcome {
                        index,
                        at: step.at,
                        op,
                        amount,
                        error: None,
                    });
                }
                Err(source) if self.fail_fast => {
                    return Err(ScriptError::StepFailed { index, op, source });
                }
                Err(e) => {
                    tracing::warn!(index, op, at = step.at, error = %e, "step failed");
                    steps.push(StepOutcome {
                        index,
                        at: step.at,
                        op,
                        amount: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        self.report(script, steps)
    }

    fn apply(&mut self, step: &Step) -> Result<Option<u128>, AccrualError> {
        let ctx = &mut self.ctx;
        let c = &self.coordinator;
        let now = Timestamp::new(step.at);
        match &step.op {
            Op::Mint {
                caller,
                to,
                amount,
                rate,
            } => {
                let amount = amount.0;
                let rate = rate.map_or_else(|| ctx.global_rate(), |r| r.0);
                c.mint(ctx, caller, to, amount, rate, now)?;
                Ok(Some(amount))
            }
            Op::Burn {
                caller,
                from,
                amount,
            } => c.burn(ctx, caller, from, amount.0, now).map(Some),
            Op::Transfer { from, to, amount } => c.transfer(ctx, from, to, amount.0, now).map(Some),
            Op::TransferFrom {
                caller,
                from,
                to,
                amount,
            } => c
                .transfer_from(ctx, caller, from, to, amount.0, now)
                .map(Some),
            Op::Approve {
                owner,
                spender,
                amount,
            } => {
                let amount = amount.0.resolve(u128::MAX);
                c.approve(ctx, owner, spender, amount)?;
                Ok(Some(amount))
            }
            Op::SetGlobalRate { caller, rate } => {
                c.set_global_rate(ctx, caller, rate.0, now)?;
                Ok(None)
            }
            Op::Settle { account } => Ok(Some(c.settle(ctx, account, now)?.increase)),
        }
    }

    fn report(self, script: &Script, steps: Vec<StepOutcome>) -> Result<Report, ScriptError> {
        let report_at = script.report_time();
        let now = Timestamp::new(report_at);
        let first = script.steps.iter().map(|s| s.at).min().unwrap_or(report_at);

        let mut accounts = Vec::new();
        for account in self.ctx.base().accounts() {
            let effective = self
                .ctx
                .effective_balance_of(&account, now)
                .map_err(ScriptError::Report)?;
            accounts.push(AccountReport {
                principal: self.ctx.principal_balance_of(&account),
                effective,
                rate: self.ctx.account_rate(&account).to_string(),
                last_sync: self.ctx.last_sync_of(&account).map(|t| t.as_secs()),
                account,
            });
        }

        let events = self
            .events
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default();

        Ok(Report {
            report_at,
            span: format_duration(report_at.saturating_sub(first)),
            global_rate: self.ctx.global_rate().to_string(),
            total_principal: self.ctx.total_principal(),
            steps,
            accounts,
            events,
        })
    }
}
