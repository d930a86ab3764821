//! Outcomes of statement batches and of a whole run.

use std::process::ExitCode;
use std::time::Duration;

use crate::catalog::{Statement, StatementKind, Table};
use crate::verify::VerificationReport;

/// What to do after a statement fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and run the next statement.
    #[default]
    Continue,
    /// Stop; every remaining statement of the run is skipped.
    FailFast,
}

impl FailurePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::Continue
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Succeeded { rows: u64 },
    Failed { error: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementReport {
    pub table: Table,
    pub kind: StatementKind,
    pub outcome: StatementOutcome,
    pub elapsed: Duration,
}

impl StatementReport {
    pub fn new(statement: &Statement, outcome: StatementOutcome, elapsed: Duration) -> Self {
        Self {
            table: statement.table(),
            kind: statement.kind(),
            outcome,
            elapsed,
        }
    }

    pub fn skipped(statement: &Statement) -> Self {
        Self::new(statement, StatementOutcome::Skipped, Duration::ZERO)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StatementOutcome::Failed { .. })
    }
}

/// Reports of one ordered batch (e.g. all drop statements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub label: String,
    pub statements: Vec<StatementReport>,
}

impl BatchReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            statements: Vec::new(),
        }
    }

    /// A batch that never ran.
    pub fn all_skipped(label: impl Into<String>, statements: &[Statement]) -> Self {
        Self {
            label: label.into(),
            statements: statements.iter().map(StatementReport::skipped).collect(),
        }
    }

    pub fn push(&mut self, report: StatementReport) {
        self.statements.push(report);
    }

    pub fn succeeded(&self) -> usize {
        self.statements
            .iter()
            .filter(|r| matches!(r.outcome, StatementOutcome::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.statements.iter().filter(|r| r.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.statements
            .iter()
            .filter(|r| r.outcome == StatementOutcome::Skipped)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn rows_affected(&self) -> u64 {
        self.statements
            .iter()
            .map(|r| match r.outcome {
                StatementOutcome::Succeeded { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.statements.iter().map(|r| r.elapsed).sum()
    }
}

/// Process exit status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// A statement or verification check failed.
    Failure,
    /// The job could not start: bad configuration or no connection.
    SetupError,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::SetupError => 2,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Every batch of a run, plus the verification report when one was made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: Vec<BatchReport>,
    pub verification: Option<VerificationReport>,
}

impl RunSummary {
    pub fn push(&mut self, batch: BatchReport) {
        self.batches.push(batch);
    }

    /// Whether later batches must be skipped under `policy`.
    pub fn halted(&self, policy: FailurePolicy) -> bool {
        policy == FailurePolicy::FailFast && self.failed_statements() > 0
    }

    pub fn failed_statements(&self) -> usize {
        self.batches.iter().map(BatchReport::failed).sum()
    }

    pub fn skipped_statements(&self) -> usize {
        self.batches.iter().map(BatchReport::skipped).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_statements() == 0
            && !self
                .verification
                .as_ref()
                .is_some_and(VerificationReport::has_violations)
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.is_success() {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }

    /// Human readable summary, one line per batch plus a verdict.
    ///
    /// Lines are prefixed `+` (clean), `-` (failures) or `~` (skipped), the
    /// same markers the plan output uses.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .batches
            .iter()
            .map(|batch| {
                let prefix = if batch.has_failures() {
                    '-'
                } else if batch.skipped() > 0 {
                    '~'
                } else {
                    '+'
                };
                format!(
                    "{prefix} {}: {} succeeded, {} failed, {} skipped, {} rows in {:.2?}",
                    batch.label,
                    batch.succeeded(),
                    batch.failed(),
                    batch.skipped(),
                    batch.rows_affected(),
                    batch.elapsed()
                )
            })
            .collect();

        for batch in &self.batches {
            for report in &batch.statements {
                if let StatementOutcome::Failed { error } = &report.outcome {
                    lines.push(format!("- {} {}: {error}", report.kind, report.table));
                }
            }
        }

        if let Some(verification) = &self.verification {
            lines.push(format!(
                "{} verification: {} violations, {} warnings",
                if verification.has_violations() { '-' } else { '+' },
                verification.violations(),
                verification.warnings()
            ));
        }

        lines.push(if self.is_success() {
            "= run succeeded".to_string()
        } else {
            format!("= run failed ({} statements failed)", self.failed_statements())
        });

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{Check, Finding, Severity};

    fn statement(table: Table) -> Statement {
        Statement::new(table, StatementKind::Drop, format!("DROP TABLE {table}"))
    }

    fn batch(outcomes: Vec<StatementOutcome>) -> BatchReport {
        let mut batch = BatchReport::new("drop");
        for outcome in outcomes {
            batch.push(StatementReport::new(
                &statement(Table::Users),
                outcome,
                Duration::from_millis(5),
            ));
        }
        batch
    }

    #[test]
    fn test_batch_counts() {
        let batch = batch(vec![
            StatementOutcome::Succeeded { rows: 3 },
            StatementOutcome::Failed {
                error: "boom".to_string(),
            },
            StatementOutcome::Succeeded { rows: 4 },
            StatementOutcome::Skipped,
        ]);

        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
        assert_eq!(batch.skipped(), 1);
        assert_eq!(batch.rows_affected(), 7);
        assert_eq!(batch.elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn test_all_skipped() {
        let statements = vec![statement(Table::Users), statement(Table::Time)];
        let batch = BatchReport::all_skipped("insert", &statements);

        assert_eq!(batch.skipped(), 2);
        assert_eq!(batch.statements[1].table, Table::Time);
        assert_eq!(batch.statements[1].elapsed, Duration::ZERO);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert_eq!(ExitStatus::SetupError.code(), 2);
    }

    #[test]
    fn test_summary_success() {
        let mut summary = RunSummary::default();
        summary.push(batch(vec![StatementOutcome::Succeeded { rows: 0 }]));

        assert!(summary.is_success());
        assert_eq!(summary.exit_status(), ExitStatus::Success);
        assert_eq!(summary.lines().last().unwrap(), "= run succeeded");
    }

    #[test]
    fn test_summary_failure() {
        let mut summary = RunSummary::default();
        summary.push(batch(vec![StatementOutcome::Failed {
            error: "relation does not exist".to_string(),
        }]));

        assert!(!summary.is_success());
        assert_eq!(summary.exit_status(), ExitStatus::Failure);

        let lines = summary.lines();
        assert!(lines[0].starts_with("- drop: 0 succeeded, 1 failed"));
        assert_eq!(lines[1], "- drop users: relation does not exist");
        assert_eq!(lines[2], "= run failed (1 statements failed)");
    }

    #[test]
    fn test_halted_only_under_fail_fast() {
        let mut summary = RunSummary::default();
        summary.push(batch(vec![StatementOutcome::Failed {
            error: "boom".to_string(),
        }]));

        assert!(summary.halted(FailurePolicy::FailFast));
        assert!(!summary.halted(FailurePolicy::Continue));
    }

    #[test]
    fn test_verification_violation_fails_run() {
        let mut summary = RunSummary::default();
        summary.push(batch(vec![StatementOutcome::Succeeded { rows: 1 }]));

        let mut verification = VerificationReport::default();
        verification.push(Finding {
            check: Check::DuplicateKeys(Table::Users),
            severity: Severity::Violation,
            message: "2 rows".to_string(),
        });
        summary.verification = Some(verification);

        assert!(!summary.is_success());
        assert_eq!(summary.exit_status(), ExitStatus::Failure);
    }

    #[test]
    fn test_verification_warning_keeps_run_successful() {
        let mut summary = RunSummary::default();

        let mut verification = VerificationReport::default();
        verification.push(Finding {
            check: Check::OrphanSongplays,
            severity: Severity::Warning,
            message: "3 rows".to_string(),
        });
        summary.verification = Some(verification);

        assert!(summary.is_success());
    }
}
