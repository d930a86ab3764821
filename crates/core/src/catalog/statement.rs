//! Statement objects: SQL template plus the values bound into it.

use std::fmt;

use super::Table;

const REDACTED: &str = "<redacted>";

/// What a statement does to its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Drop,
    Create,
    Copy,
    Insert,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Drop => "drop",
            StatementKind::Create => "create",
            StatementKind::Copy => "copy",
            StatementKind::Insert => "insert",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named value substituted into a template as a SQL string literal.
#[derive(Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: &'static str,
    pub value: String,
    /// Secret values are replaced by `<redacted>` in displayed SQL.
    pub secret: bool,
}

impl Binding {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            secret: false,
        }
    }

    pub fn secret(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            secret: true,
        }
    }

    fn display_value(&self) -> &str {
        if self.secret {
            REDACTED
        } else {
            &self.value
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("value", &self.display_value())
            .finish()
    }
}

/// One executable unit of a batch.
#[derive(Clone, PartialEq, Eq)]
pub struct Statement {
    table: Table,
    kind: StatementKind,
    template: String,
    bindings: Vec<Binding>,
    sql: String,
}

impl Statement {
    /// A statement with no bindings; the template is the SQL.
    pub fn new(table: Table, kind: StatementKind, sql: impl Into<String>) -> Self {
        Self::with_bindings(table, kind, sql, Vec::new())
    }

    /// Renders `template`, replacing each `{name}` with the quoted binding value.
    pub fn with_bindings(
        table: Table,
        kind: StatementKind,
        template: impl Into<String>,
        bindings: Vec<Binding>,
    ) -> Self {
        let template = template.into();
        let sql = render(&template, &bindings, false);
        Self {
            table,
            kind,
            template,
            bindings,
            sql,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// SQL text to execute.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// SQL text with secret bindings masked, for logs and plans.
    pub fn redacted_sql(&self) -> String {
        render(&self.template, &self.bindings, true)
    }

    /// Short human label, e.g. `create staging_events`.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.table)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("table", &self.table)
            .field("kind", &self.kind)
            .field("sql", &self.redacted_sql())
            .finish()
    }
}

/// Renders `value` as a single-quoted SQL literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Strips one pair of surrounding single quotes.
///
/// Older `dwh.cfg` files carry values such as `'s3://bucket/log_data'` that
/// were meant to be pasted into SQL as-is.
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(trimmed)
}

// Single pass so a bound value containing `{name}` is never expanded again.
fn render(template: &str, bindings: &[Binding], redact: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let found = after.find('}').and_then(|close| {
            let name = &after[..close];
            bindings
                .iter()
                .find(|b| b.name == name)
                .map(|b| (b, close))
        });

        match found {
            Some((binding, close)) => {
                let value = if redact {
                    binding.display_value()
                } else {
                    binding.value.as_str()
                };
                out.push_str(&quote_literal(value));
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("s3://bucket/o'neil"), "'s3://bucket/o''neil'");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'s3://bucket/log_data'"), "s3://bucket/log_data");
        assert_eq!(unquote("  s3://bucket/log_data "), "s3://bucket/log_data");
        assert_eq!(unquote("'unbalanced"), "'unbalanced");
    }

    #[test]
    fn test_render_substitutes_bindings() {
        let statement = Statement::with_bindings(
            Table::StagingSongs,
            StatementKind::Copy,
            "COPY x FROM {source} CREDENTIALS {credentials}",
            vec![
                Binding::new("source", "s3://bucket/songs"),
                Binding::secret("credentials", "aws_iam_role=arn:aws:iam::1:role/r"),
            ],
        );

        assert_eq!(
            statement.sql(),
            "COPY x FROM 's3://bucket/songs' CREDENTIALS 'aws_iam_role=arn:aws:iam::1:role/r'"
        );
        assert_eq!(
            statement.redacted_sql(),
            "COPY x FROM 's3://bucket/songs' CREDENTIALS '<redacted>'"
        );
    }

    #[test]
    fn test_render_leaves_unknown_braces() {
        let statement = Statement::with_bindings(
            Table::StagingEvents,
            StatementKind::Copy,
            "SELECT '{not_a_binding}', {a}",
            vec![Binding::new("a", "{not_a_binding}")],
        );

        assert_eq!(
            statement.sql(),
            "SELECT '{not_a_binding}', '{not_a_binding}'"
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let statement = Statement::with_bindings(
            Table::StagingEvents,
            StatementKind::Copy,
            "COPY x CREDENTIALS {credentials}",
            vec![Binding::secret("credentials", "top-secret")],
        );

        let debug = format!("{statement:?}");
        assert!(!debug.contains("top-secret"));
    }

    #[test]
    fn test_label() {
        let statement = Statement::new(Table::Users, StatementKind::Drop, "DROP TABLE users");
        assert_eq!(statement.label(), "drop users");
    }
}
