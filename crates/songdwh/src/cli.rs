//! Command-line surface shared by the two binaries.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use songdwh_core::{ExitStatus, FailurePolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{load_config, DEFAULT_CONFIG_PATH};
use crate::jobs::{self, JobOptions, JobOutcome};
use crate::prelude::*;
use crate::session::PgConnector;

/// Flags accepted by both `create-tables` and `etl`.
#[derive(Debug, Clone, clap::Args)]
pub struct SharedArgs {
    /// Path to the warehouse configuration file
    #[arg(long, short, env = "SONGDWH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Stop at the first failed statement and skip the rest of the run
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the statements that would run, without connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short)]
    pub verbose: bool,
}

impl SharedArgs {
    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            policy: FailurePolicy::from_fail_fast(self.fail_fast),
            dry_run: self.dry_run,
            verify: false,
        }
    }
}

/// `create-tables`: drop and recreate every table.
#[derive(Debug, clap::Parser)]
#[command(name = "create-tables")]
#[command(version, about, long_about = "Drop and recreate the staging and star-schema tables.

Must run before `etl`. Every statement commits on its own; a failed
statement is logged and the rest still run unless --fail-fast is given.

Exit status: 0 success, 1 a statement failed, 2 configuration or
connection error.")]
pub struct CreateTablesCli {
    #[command(flatten)]
    pub shared: SharedArgs,
}

/// `etl`: load staging from object storage and populate the star schema.
#[derive(Debug, clap::Parser)]
#[command(name = "etl")]
#[command(version, about, long_about = "Copy raw JSON from S3 into staging, then populate the star schema.

Run `create-tables` first. With --verify the loaded tables are checked for
duplicate and NULL keys, orphan fact rows and time decomposition.

Exit status: 0 success, 1 a statement or verification check failed,
2 configuration or connection error.")]
pub struct EtlCli {
    #[command(flatten)]
    pub shared: SharedArgs,

    /// Check the star schema after loading
    #[arg(long)]
    pub verify: bool,
}

impl EtlCli {
    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            verify: self.verify,
            ..self.shared.job_options()
        }
    }
}

/// Default log filter: info for our crates, debug with `--verbose`.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "songdwh=debug,songdwh_core=debug"
    } else {
        "songdwh=info,songdwh_core=info"
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Which job a binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Schema,
    Load,
}

/// Loads the config, runs `job` against the warehouse and reports the result.
pub async fn run(job: Job, shared: &SharedArgs, options: JobOptions) -> ExitCode {
    let loaded = load_config(&shared.config).context("Cannot start without a configuration");
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Configuration error");
            aprintln!("{} {err:#}", p_r("Error:"));
            return ExitStatus::SetupError.into();
        }
    };

    if !options.dry_run {
        aprintln!("{} {}", p_b("Target:"), config.cluster.target_display());
        aprintln!();
    }

    let result = match job {
        Job::Schema => jobs::run_schema_job(&PgConnector, &config, options).await,
        Job::Load => jobs::run_load_job(&PgConnector, &config, options).await,
    };

    match result {
        Ok(outcome) => {
            report(&outcome);
            outcome.exit_status().into()
        }
        Err(err) => {
            tracing::error!(error = %err, "Job could not start");
            aprintln!("{} {err}", p_r("Error:"));
            err.exit_status().into()
        }
    }
}

fn report(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Planned(lines) => print_section("Plan:", lines),
        JobOutcome::Ran(summary) => {
            if let Some(verification) = &summary.verification {
                print_section("Verification:", &verification.lines());
            }
            print_section("Summary:", &summary.lines());
        }
    }
}
