//! Serial execution of a statement batch.

use std::time::{Duration, Instant};

use songdwh_core::{BatchReport, FailurePolicy, Statement, StatementOutcome, StatementReport};

use crate::session::WarehouseSession;

/// Executes `statements` in order and records the outcome of each.
///
/// Under [`FailurePolicy::Continue`] a failure is logged and the next
/// statement runs. Under [`FailurePolicy::FailFast`] the statements after the
/// first failure are recorded as skipped.
pub async fn run_batch<S>(
    session: &mut S,
    label: &str,
    statements: &[Statement],
    policy: FailurePolicy,
) -> BatchReport
where
    S: WarehouseSession + ?Sized,
{
    let mut report = BatchReport::new(label);
    let mut halted = false;

    tracing::info!(batch = label, statements = statements.len(), "Starting batch");

    for statement in statements {
        if halted {
            tracing::warn!(
                batch = label,
                table = %statement.table(),
                kind = %statement.kind(),
                "Skipping statement after earlier failure"
            );
            report.push(StatementReport::skipped(statement));
            continue;
        }

        tracing::debug!(
            batch = label,
            table = %statement.table(),
            kind = %statement.kind(),
            sql = %statement.redacted_sql(),
            "Executing statement"
        );

        let started = Instant::now();
        let result = session.execute(statement).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(rows) => {
                tracing::info!(
                    batch = label,
                    table = %statement.table(),
                    kind = %statement.kind(),
                    rows,
                    elapsed_ms = elapsed_ms(elapsed),
                    "Statement succeeded"
                );
                StatementOutcome::Succeeded { rows }
            }
            Err(err) => {
                tracing::error!(
                    batch = label,
                    table = %statement.table(),
                    kind = %statement.kind(),
                    code = err.code().unwrap_or("-"),
                    elapsed_ms = elapsed_ms(elapsed),
                    error = %err,
                    "Statement failed"
                );
                if policy == FailurePolicy::FailFast {
                    halted = true;
                }
                StatementOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };

        report.push(StatementReport::new(statement, outcome, elapsed));
    }

    tracing::info!(
        batch = label,
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Finished batch"
    );

    report
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RecordingSession;
    use songdwh_core::{StatementKind, Table};

    fn statements() -> Vec<Statement> {
        [Table::Users, Table::Songs, Table::Artists]
            .into_iter()
            .map(|table| {
                Statement::new(table, StatementKind::Create, format!("CREATE TABLE {table}"))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_runs_every_statement_in_order() {
        let mut session = RecordingSession::new().with_rows(Table::Songs, StatementKind::Create, 0);

        let report = run_batch(&mut session, "create", &statements(), FailurePolicy::Continue).await;

        assert_eq!(report.label, "create");
        assert_eq!(report.succeeded(), 3);
        assert_eq!(
            session.executed_labels().await,
            vec!["create users", "create songs", "create artists"]
        );
    }

    #[tokio::test]
    async fn test_continue_after_failure() {
        let mut session = RecordingSession::new().fail_on(Table::Users, StatementKind::Create);

        let report = run_batch(&mut session, "create", &statements(), FailurePolicy::Continue).await;

        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 2);
        assert!(matches!(
            &report.statements[0].outcome,
            StatementOutcome::Failed { error } if error.contains("simulated failure of create users")
        ));
        assert_eq!(session.executed().await.len(), 3);
    }

    #[tokio::test]
    async fn test_fail_fast_skips_the_rest() {
        let mut session = RecordingSession::new().fail_on(Table::Songs, StatementKind::Create);

        let report = run_batch(&mut session, "create", &statements(), FailurePolicy::FailFast).await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.statements[2].outcome, StatementOutcome::Skipped);
        assert_eq!(
            session.executed_labels().await,
            vec!["create users", "create songs"]
        );
    }

    #[tokio::test]
    async fn test_rows_affected_are_recorded() {
        let mut session = RecordingSession::new().with_rows(Table::Artists, StatementKind::Create, 9);

        let report = run_batch(&mut session, "create", &statements(), FailurePolicy::Continue).await;

        assert_eq!(report.rows_affected(), 9);
    }

    #[test]
    fn test_elapsed_ms_saturates() {
        assert_eq!(elapsed_ms(Duration::from_millis(1_500)), 1_500);
        assert_eq!(elapsed_ms(Duration::MAX), u64::MAX);
    }
}
