//! Pure functions formatting execution plans for `--dry-run`.
//!
//! Line prefixes: `-` drop, `+` create or insert, `~` copy, `=` read-only
//! check. The shell colors lines by prefix.

use crate::catalog::{QueryCatalog, Result, Statement, StatementKind};
use crate::verify::VerificationQuery;

fn prefix(kind: StatementKind) -> char {
    match kind {
        StatementKind::Drop => '-',
        StatementKind::Create | StatementKind::Insert => '+',
        StatementKind::Copy => '~',
    }
}

fn indented(sql: &str) -> impl Iterator<Item = String> + '_ {
    sql.lines().map(|line| format!("    {line}"))
}

/// Header line followed by each statement and its SQL, secrets redacted.
pub fn format_statements(label: &str, statements: &[Statement]) -> Vec<String> {
    let mut lines = vec![format!("{label} ({} statements)", statements.len())];
    for (index, statement) in statements.iter().enumerate() {
        lines.push(format!(
            "{} {}. {}",
            prefix(statement.kind()),
            index + 1,
            statement.label()
        ));
        lines.extend(indented(&statement.redacted_sql()));
    }
    lines
}

pub fn format_verification(queries: &[VerificationQuery]) -> Vec<String> {
    let mut lines = vec![format!("verify ({} queries)", queries.len())];
    for query in queries {
        lines.push(format!("= {}", query.check));
        lines.extend(indented(&query.sql));
    }
    lines
}

/// Plan of the schema job: drops, then creates.
pub fn schema_plan(catalog: &QueryCatalog) -> Vec<String> {
    let mut lines = format_statements("drop", catalog.drop_statements());
    lines.push(String::new());
    lines.extend(format_statements("create", catalog.create_statements()));
    lines
}

/// Plan of the load job: copies, inserts and optionally the checks.
///
/// Fails like the job itself would when the copy statements cannot be built.
pub fn load_plan(catalog: &QueryCatalog, verify: bool) -> Result<Vec<String>> {
    let mut lines = format_statements("copy", catalog.copy_statements()?);
    lines.push(String::new());
    lines.extend(format_statements("insert", catalog.insert_statements()));
    if verify {
        lines.push(String::new());
        lines.extend(format_verification(&catalog.verification_queries()));
    }
    Ok(lines)
}
