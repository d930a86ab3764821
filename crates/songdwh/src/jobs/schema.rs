//! Schema initializer: drop every table, then create every table.

use songdwh_core::{BatchReport, FailurePolicy, QueryCatalog, RunSummary};

use crate::runner::run_batch;
use crate::session::WarehouseSession;

pub async fn drop_tables<S>(
    session: &mut S,
    catalog: &QueryCatalog,
    policy: FailurePolicy,
) -> BatchReport
where
    S: WarehouseSession + ?Sized,
{
    run_batch(session, "drop", catalog.drop_statements(), policy).await
}

pub async fn create_tables<S>(
    session: &mut S,
    catalog: &QueryCatalog,
    policy: FailurePolicy,
) -> BatchReport
where
    S: WarehouseSession + ?Sized,
{
    run_batch(session, "create", catalog.create_statements(), policy).await
}

/// Drops then recreates all seven tables.
///
/// A partial failure leaves the schema partially created; nothing is rolled
/// back.
pub async fn initialize_schema<S>(
    session: &mut S,
    catalog: &QueryCatalog,
    policy: FailurePolicy,
) -> RunSummary
where
    S: WarehouseSession + ?Sized,
{
    let mut summary = RunSummary::default();
    summary.push(drop_tables(session, catalog, policy).await);

    if summary.halted(policy) {
        summary.push(BatchReport::all_skipped(
            "create",
            catalog.create_statements(),
        ));
    } else {
        summary.push(create_tables(session, catalog, policy).await);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::test_support::catalog;
    use crate::session::RecordingSession;
    use songdwh_core::{Dialect, StatementKind, Table};

    #[tokio::test]
    async fn test_drop_then_create_in_order() {
        let mut session = RecordingSession::new();

        let summary = initialize_schema(
            &mut session,
            &catalog(Dialect::Redshift),
            FailurePolicy::Continue,
        )
        .await;

        assert!(summary.is_success());
        assert_eq!(
            session.executed_labels().await,
            vec![
                "drop staging_events",
                "drop staging_songs",
                "drop songplays",
                "drop users",
                "drop songs",
                "drop artists",
                "drop time",
                "create staging_events",
                "create staging_songs",
                "create users",
                "create artists",
                "create songs",
                "create time",
                "create songplays",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_drop_does_not_stop_the_batch() {
        let mut session = RecordingSession::new().fail_on(Table::Users, StatementKind::Drop);

        let summary = initialize_schema(
            &mut session,
            &catalog(Dialect::Redshift),
            FailurePolicy::Continue,
        )
        .await;

        assert_eq!(summary.failed_statements(), 1);
        assert_eq!(session.executed().await.len(), 14);
        assert_eq!(summary.exit_status().code(), 1);
    }

    #[tokio::test]
    async fn test_fail_fast_skips_create_batch() {
        let mut session = RecordingSession::new().fail_on(Table::Songplays, StatementKind::Drop);

        let summary = initialize_schema(
            &mut session,
            &catalog(Dialect::Redshift),
            FailurePolicy::FailFast,
        )
        .await;

        assert_eq!(summary.failed_statements(), 1);
        // 4 drops after songplays, plus all 7 creates
        assert_eq!(summary.skipped_statements(), 4 + 7);
        assert_eq!(session.executed().await.len(), 3);
    }
}
