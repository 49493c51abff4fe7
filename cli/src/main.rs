//! DRIP command line: validate a ledger config or replay an operation script.

mod config;
mod script;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use config::LedgerConfig;
use drip_utils::LogFormat;
use script::{Script, ScriptRunner};

#[derive(Parser)]
#[command(name = "drip-cli", about = "DRIP accrual ledger tool")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "DRIP_CONFIG")]
    config: Option<PathBuf>,

    /// Initial global rate as a decimal fraction per second.
    #[arg(long, env = "DRIP_INITIAL_RATE")]
    initial_rate: Option<String>,

    /// Accounts granted the mint/burn role (comma-separated).
    #[arg(long, env = "DRIP_MINTERS", value_delimiter = ',')]
    minters: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DRIP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DRIP_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a JSON operation script and print the resulting balances as JSON.
    Run {
        #[arg(long)]
        script: PathBuf,

        /// Abort on the first failing step instead of recording it.
        #[arg(long)]
        fail_fast: bool,

        /// Exit non-zero if any step failed.
        #[arg(long)]
        strict: bool,
    },
    /// Validate the effective configuration and print it as TOML.
    CheckConfig,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LedgerConfig::default(),
        };
        if let Some(rate) = &self.initial_rate {
            config.initial_global_rate = rate.clone();
        }
        if !self.minters.is_empty() {
            config.minters = self.minters.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    drip_utils::init_logging(config.log_format, &config.log_level);
    config.validate().context("invalid configuration")?;
    tracing::info!(
        rate = %config.initial_global_rate,
        owner = %config.owner,
        minters = config.minters.len(),
        "configuration loaded"
    );

    match cli.command {
        Command::CheckConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            script,
            fail_fast,
            strict,
        } => {
            let parsed = Script::from_json_file(&script)?;
            let (ctx, coordinator) = config.build_ledger()?;
            let report = ScriptRunner::new(ctx, coordinator)
                .fail_fast(fail_fast)
                .run(&parsed)?;
            println!("{}", serde_json::to_string_pretty(&report)?);

            let failures = report.failures();
            tracing::info!(
                steps = report.steps.len(),
                failures,
                span = %report.span,
                "script finished"
            );
            if strict && failures > 0 {
                anyhow::bail!("{failures} step(s) failed");
            }
        }
    }

    Ok(())
}
