//! In-memory session for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use songdwh_core::{ClusterConfig, Statement, StatementKind, Table};
use tokio::sync::RwLock;

use super::{Connector, IntRows, Result, SessionError, WarehouseSession};

#[derive(Debug, Default)]
struct Recorded {
    statements: Vec<Statement>,
    queries: Vec<String>,
    closed: bool,
}

/// Records every statement instead of running it.
///
/// Clones share what was recorded, so a test can keep one handle while the
/// job under test owns another. Failures, row counts and query results are
/// configured up front with the builder methods.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    recorded: Arc<RwLock<Recorded>>,
    failures: HashSet<(Table, StatementKind)>,
    rows: HashMap<(Table, StatementKind), u64>,
    query_results: HashMap<String, IntRows>,
    refuse_connections: bool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `kind` statement on `table` fail.
    pub fn fail_on(mut self, table: Table, kind: StatementKind) -> Self {
        self.failures.insert((table, kind));
        self
    }

    /// Rows reported for the `kind` statement on `table` (default 0).
    pub fn with_rows(mut self, table: Table, kind: StatementKind, rows: u64) -> Self {
        self.rows.insert((table, kind), rows);
        self
    }

    /// Rows returned for `sql`. Unknown queries return a single `0`.
    pub fn with_query_result(mut self, sql: impl Into<String>, rows: IntRows) -> Self {
        self.query_results.insert(sql.into(), rows);
        self
    }

    /// Makes [`Connector::connect`] fail.
    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    /// Statements executed so far, in order.
    pub async fn executed(&self) -> Vec<Statement> {
        self.recorded.read().await.statements.clone()
    }

    /// `kind table` labels of the executed statements.
    pub async fn executed_labels(&self) -> Vec<String> {
        self.recorded
            .read()
            .await
            .statements
            .iter()
            .map(Statement::label)
            .collect()
    }

    pub async fn queries(&self) -> Vec<String> {
        self.recorded.read().await.queries.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.recorded.read().await.closed
    }
}

#[async_trait]
impl WarehouseSession for RecordingSession {
    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let mut recorded = self.recorded.write().await;
        if recorded.closed {
            return Err(SessionError::Closed);
        }
        recorded.statements.push(statement.clone());

        let key = (statement.table(), statement.kind());
        if self.failures.contains(&key) {
            return Err(SessionError::Statement {
                table: statement.table(),
                message: format!("simulated failure of {}", statement.label()),
                code: Some("XX000".to_string()),
            });
        }

        Ok(self.rows.get(&key).copied().unwrap_or(0))
    }

    async fn query_i64(&mut self, sql: &str) -> Result<IntRows> {
        let mut recorded = self.recorded.write().await;
        if recorded.closed {
            return Err(SessionError::Closed);
        }
        recorded.queries.push(sql.to_string());

        Ok(self
            .query_results
            .get(sql)
            .cloned()
            .unwrap_or_else(|| vec![vec![Some(0)]]))
    }

    async fn close(&mut self) -> Result<()> {
        let mut recorded = self.recorded.write().await;
        if recorded.closed {
            return Err(SessionError::Closed);
        }
        recorded.closed = true;
        Ok(())
    }
}

#[async_trait]
impl Connector for RecordingSession {
    type Session = RecordingSession;

    async fn connect(&self, cluster: &ClusterConfig) -> Result<RecordingSession> {
        if self.refuse_connections {
            return Err(SessionError::Connection {
                target: cluster.target_display(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(table: Table, kind: StatementKind) -> Statement {
        Statement::new(table, kind, format!("{kind} {table}"))
    }

    #[tokio::test]
    async fn test_records_statements_across_clones() {
        let session = RecordingSession::new().with_rows(Table::Users, StatementKind::Insert, 7);
        let mut handle = session.clone();

        let rows = handle
            .execute(&statement(Table::Users, StatementKind::Insert))
            .await
            .unwrap();

        assert_eq!(rows, 7);
        assert_eq!(session.executed_labels().await, vec!["insert users"]);
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let mut session = RecordingSession::new().fail_on(Table::Time, StatementKind::Create);

        let err = session
            .execute(&statement(Table::Time, StatementKind::Create))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Statement { table: Table::Time, .. }));

        // other kinds on the same table succeed
        assert!(session
            .execute(&statement(Table::Time, StatementKind::Drop))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_query_results() {
        let mut session = RecordingSession::new()
            .with_query_result("SELECT COUNT(*) FROM \"users\"", vec![vec![Some(42)]]);

        assert_eq!(
            session.query_i64("SELECT COUNT(*) FROM \"users\"").await.unwrap(),
            vec![vec![Some(42)]]
        );
        assert_eq!(
            session.query_i64("SELECT 1").await.unwrap(),
            vec![vec![Some(0)]]
        );
        assert_eq!(session.queries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let mut session = RecordingSession::new();
        session.close().await.unwrap();

        assert!(session.is_closed().await);
        assert_eq!(
            session
                .execute(&statement(Table::Users, StatementKind::Drop))
                .await
                .unwrap_err(),
            SessionError::Closed
        );
        assert_eq!(session.close().await.unwrap_err(), SessionError::Closed);
    }
}
