//! Post-load verification of the star schema.
//!
//! The shell runs each [`VerificationQuery`] and hands back the raw integer
//! rows; everything else (what counts as a problem, how it is reported)
//! happens here.

use std::fmt;

use crate::catalog::Table;
use crate::time::{TimeParts, TimestampUnit};

/// Number of `time` rows compared against [`TimeParts`].
pub const TIME_SAMPLE_SIZE: usize = 5;

/// Final tables whose row counts are reported.
pub const COUNTED_TABLES: [Table; 5] = [
    Table::Songplays,
    Table::Users,
    Table::Songs,
    Table::Artists,
    Table::Time,
];

/// One property of the loaded tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    RowCount(Table),
    DuplicateKeys(Table),
    NullKeys(Table),
    /// Songplays whose `start_time` has no `time` row.
    OrphanSongplays,
    /// Stored calendar fields of sampled `time` rows.
    TimeSpotCheck,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::RowCount(table) => write!(f, "row count of {table}"),
            Check::DuplicateKeys(table) => write!(f, "duplicate keys in {table}"),
            Check::NullKeys(table) => write!(f, "null keys in {table}"),
            Check::OrphanSongplays => f.write_str("songplays without a time row"),
            Check::TimeSpotCheck => f.write_str("time decomposition"),
        }
    }
}

/// A read-only query whose columns are all integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationQuery {
    pub check: Check,
    pub sql: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Violation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: Check,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(check: Check, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
        }
    }
}

/// Every verification query, counts first.
pub fn verification_queries() -> Vec<VerificationQuery> {
    let mut queries: Vec<VerificationQuery> = COUNTED_TABLES
        .iter()
        .map(|&table| VerificationQuery {
            check: Check::RowCount(table),
            sql: format!("SELECT COUNT(*) FROM {}", table.ident()),
        })
        .collect();

    for table in Table::DIMENSIONS {
        let Some(key) = table.primary_key() else {
            continue;
        };
        queries.push(VerificationQuery {
            check: Check::DuplicateKeys(table),
            sql: format!(
                "SELECT COUNT({key}) - COUNT(DISTINCT {key}) FROM {}",
                table.ident()
            ),
        });
        queries.push(VerificationQuery {
            check: Check::NullKeys(table),
            sql: format!(
                "SELECT COUNT(*) FROM {} WHERE {key} IS NULL",
                table.ident()
            ),
        });
    }

    queries.push(VerificationQuery {
        check: Check::OrphanSongplays,
        sql: "SELECT COUNT(*) FROM \"songplays\" sp \
              LEFT JOIN \"time\" t ON sp.start_time = t.start_time \
              WHERE t.start_time IS NULL"
            .to_string(),
    });

    queries.push(VerificationQuery {
        check: Check::TimeSpotCheck,
        sql: format!(
            "SELECT CAST(EXTRACT(epoch FROM start_time) AS BIGINT), \
             CAST(hour AS BIGINT), CAST(day AS BIGINT), CAST(week AS BIGINT), \
             CAST(month AS BIGINT), CAST(year AS BIGINT), CAST(weekday AS BIGINT) \
             FROM \"time\" ORDER BY start_time LIMIT {TIME_SAMPLE_SIZE}"
        ),
    });

    queries
}

/// Turns the rows returned for `check` into a finding.
pub fn evaluate(check: Check, rows: &[Vec<Option<i64>>]) -> Finding {
    match check {
        Check::TimeSpotCheck => evaluate_time_sample(rows),
        Check::RowCount(_) => evaluate_count(check, rows, |value| {
            (Severity::Ok, format!("{value} rows"))
        }),
        Check::DuplicateKeys(_) | Check::NullKeys(_) => evaluate_count(check, rows, |value| {
            if value == 0 {
                (Severity::Ok, "none".to_string())
            } else {
                (Severity::Violation, format!("{value} rows"))
            }
        }),
        Check::OrphanSongplays => evaluate_count(check, rows, |value| {
            if value == 0 {
                (Severity::Ok, "none".to_string())
            } else {
                (
                    Severity::Warning,
                    format!("{value} rows; check ETL.TIME_PAGE_FILTER"),
                )
            }
        }),
    }
}

fn single_value(rows: &[Vec<Option<i64>>]) -> Option<i64> {
    match rows {
        [row] => match row.as_slice() {
            [value] => Some(value.unwrap_or(0)),
            _ => None,
        },
        _ => None,
    }
}

fn evaluate_count<F>(check: Check, rows: &[Vec<Option<i64>>], judge: F) -> Finding
where
    F: FnOnce(i64) -> (Severity, String),
{
    match single_value(rows) {
        Some(value) => {
            let (severity, message) = judge(value);
            Finding::new(check, severity, message)
        }
        None => Finding::new(
            check,
            Severity::Violation,
            "query did not return a single integer",
        ),
    }
}

fn evaluate_time_sample(rows: &[Vec<Option<i64>>]) -> Finding {
    let check = Check::TimeSpotCheck;
    if rows.is_empty() {
        return Finding::new(check, Severity::Ok, "time table is empty");
    }

    let mismatches: Vec<String> = rows.iter().filter_map(|row| time_row_mismatch(row)).collect();

    if mismatches.is_empty() {
        Finding::new(check, Severity::Ok, format!("{} rows match", rows.len()))
    } else {
        Finding::new(check, Severity::Violation, mismatches.join("; "))
    }
}

fn time_row_mismatch(row: &[Option<i64>]) -> Option<String> {
    let [Some(epoch), hour, day, week, month, year, weekday] = row else {
        return Some(format!("unexpected row shape {row:?}"));
    };

    let Some(expected) = TimeParts::from_epoch(*epoch, TimestampUnit::Seconds) else {
        return Some(format!("epoch {epoch} is out of range"));
    };

    let stored = [*hour, *day, *week, *month, *year, *weekday];
    let computed = [
        Some(i64::from(expected.hour)),
        Some(i64::from(expected.day)),
        Some(i64::from(expected.week)),
        Some(i64::from(expected.month)),
        Some(i64::from(expected.year)),
        Some(i64::from(expected.weekday)),
    ];

    if stored == computed {
        None
    } else {
        Some(format!(
            "{}: stored {:?}, expected {:?}",
            expected.start_time, stored, computed
        ))
    }
}

/// All findings of one verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn violations(&self) -> usize {
        self.count(Severity::Violation)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_violations(&self) -> bool {
        self.violations() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// One line per finding, prefixed `=` (ok), `~` (warning) or `!` (violation).
    pub fn lines(&self) -> Vec<String> {
        self.findings
            .iter()
            .map(|f| {
                let prefix = match f.severity {
                    Severity::Ok => '=',
                    Severity::Warning => '~',
                    Severity::Violation => '!',
                };
                format!("{prefix} {}: {}", f.check, f.message)
            })
            .collect()
    }
}
