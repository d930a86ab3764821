//! Loader: bulk copy into staging, then populate the star schema.

use songdwh_core::{BatchReport, CatalogError, FailurePolicy, QueryCatalog, RunSummary};

use crate::runner::run_batch;
use crate::session::WarehouseSession;

/// Copies the raw JSON into the two staging tables.
pub async fn copy_tables<S>(
    session: &mut S,
    catalog: &QueryCatalog,
    policy: FailurePolicy,
) -> Result<BatchReport, CatalogError>
where
    S: WarehouseSession + ?Sized,
{
    let statements = catalog.copy_statements()?;
    Ok(run_batch(session, "copy", statements, policy).await)
}

/// Runs the five `INSERT ... SELECT` statements, fact table first.
pub async fn insert_tables<S>(
    session: &mut S,
    catalog: &QueryCatalog,
    policy: FailurePolicy,
) -> BatchReport
where
    S: WarehouseSession + ?Sized,
{
    run_batch(session, "insert", catalog.insert_statements(), policy).await
}

/// Copy then insert. No atomicity across statements.
pub async fn load_warehouse<S>(
    session: &mut S,
    catalog: &QueryCatalog,
    policy: FailurePolicy,
) -> Result<RunSummary, CatalogError>
where
    S: WarehouseSession + ?Sized,
{
    let mut summary = RunSummary::default();
    summary.push(copy_tables(session, catalog, policy).await?);

    if summary.halted(policy) {
        summary.push(BatchReport::all_skipped(
            "insert",
            catalog.insert_statements(),
        ));
    } else {
        summary.push(insert_tables(session, catalog, policy).await);
    }

    Ok(summary)
}
