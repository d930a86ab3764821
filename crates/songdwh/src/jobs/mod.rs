//! The two batch jobs and their shared driver.
//!
//! `run_schema_job` and `run_load_job` are what the binaries call: build the
//! plan or connect, run the batches, close the session. They never print;
//! the caller decides how to show the [`JobOutcome`].

pub mod load;
pub mod schema;
pub mod verify;

use songdwh_core::{
    plan, CatalogError, ExitStatus, FailurePolicy, QueryCatalog, RunSummary, WarehouseConfig,
};
use thiserror::Error;

use crate::session::{Connector, SessionError, WarehouseSession};

pub use load::{copy_tables, insert_tables, load_warehouse};
pub use schema::{create_tables, drop_tables, initialize_schema};
pub use verify::verify_warehouse;

/// Errors that stop a job before any statement runs.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl JobError {
    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::SetupError
    }
}

/// Flags shared by both jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub policy: FailurePolicy,
    pub dry_run: bool,
    /// Load job only: verify the star schema after loading.
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// `--dry-run`: the plan that would have run.
    Planned(Vec<String>),
    Ran(RunSummary),
}

impl JobOutcome {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            JobOutcome::Planned(_) => ExitStatus::Success,
            JobOutcome::Ran(summary) => summary.exit_status(),
        }
    }
}

/// Drops and recreates every table.
pub async fn run_schema_job<C>(
    connector: &C,
    config: &WarehouseConfig,
    options: JobOptions,
) -> Result<JobOutcome, JobError>
where
    C: Connector,
{
    let catalog = QueryCatalog::new(config);
    if options.dry_run {
        return Ok(JobOutcome::Planned(plan::schema_plan(&catalog)));
    }

    tracing::info!(dialect = catalog.dialect().as_str(), "Initializing schema");
    let mut session = connector.connect(&config.cluster).await?;
    let summary = initialize_schema(&mut session, &catalog, options.policy).await;
    close(&mut session).await;

    Ok(JobOutcome::Ran(summary))
}

/// Copies into staging, runs the inserts and optionally verifies.
pub async fn run_load_job<C>(
    connector: &C,
    config: &WarehouseConfig,
    options: JobOptions,
) -> Result<JobOutcome, JobError>
where
    C: Connector,
{
    let catalog = QueryCatalog::new(config);
    if options.dry_run {
        return Ok(JobOutcome::Planned(plan::load_plan(
            &catalog,
            options.verify,
        )?));
    }

    // Fail before connecting when the copy statements cannot be built.
    catalog.copy_statements()?;

    tracing::info!(dialect = catalog.dialect().as_str(), "Loading warehouse");
    let mut session = connector.connect(&config.cluster).await?;
    let result = load_warehouse(&mut session, &catalog, options.policy).await;

    let summary = match result {
        Ok(mut summary) => {
            if options.verify && !summary.halted(options.policy) {
                summary.verification = Some(verify_warehouse(&mut session, &catalog).await);
            }
            summary
        }
        Err(err) => {
            close(&mut session).await;
            return Err(err.into());
        }
    };

    close(&mut session).await;
    Ok(JobOutcome::Ran(summary))
}

// A failed close does not change the outcome of the run.
async fn close<S: WarehouseSession>(session: &mut S) {
    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "Failed to close warehouse session");
    }
}
