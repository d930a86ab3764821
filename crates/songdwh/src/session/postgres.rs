//! Postgres-protocol session (Redshift and Postgres).

use std::time::Duration;

use async_trait::async_trait;
use songdwh_core::{ClusterConfig, SslMode, Statement};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{ConnectOptions, Connection, Executor, PgConnection, Row};

use super::error::{query_error, statement_error};
use super::{Connector, IntRows, Result, SessionError, WarehouseSession};

/// One connection, no pool. Statements go over the simple query protocol so
/// each one commits on its own.
pub struct PgSession {
    connection: Option<PgConnection>,
    target: String,
}

impl PgSession {
    /// Connects using cluster settings.
    pub async fn connect(cluster: &ClusterConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&cluster.host)
            .port(cluster.db_port)
            .database(&cluster.db_name)
            .username(&cluster.db_user)
            .password(&cluster.db_password)
            .ssl_mode(ssl_mode(cluster.ssl_mode));

        Self::connect_with(options, cluster.connect_timeout(), cluster.target_display()).await
    }

    /// Connects using prepared driver options, e.g. parsed from a DSN.
    pub async fn connect_with(
        options: PgConnectOptions,
        timeout: Duration,
        target: String,
    ) -> Result<Self> {
        // Redshift rejects the extra_float_digits startup parameter.
        let options = options.extra_float_digits(None::<i8>);

        tracing::debug!(
            warehouse = %target,
            timeout_secs = timeout.as_secs(),
            "Connecting to warehouse"
        );

        let connection = match tokio::time::timeout(timeout, options.connect()).await {
            Ok(Ok(connection)) => connection,
            Ok(Err(err)) => {
                return Err(SessionError::Connection {
                    target,
                    message: err.to_string(),
                })
            }
            Err(_) => {
                return Err(SessionError::Connection {
                    target,
                    message: format!("timed out after {}s", timeout.as_secs()),
                })
            }
        };

        tracing::info!(warehouse = %target, "Connected to warehouse");

        Ok(Self {
            connection: Some(connection),
            target,
        })
    }

    fn connection(&mut self) -> Result<&mut PgConnection> {
        self.connection.as_mut().ok_or(SessionError::Closed)
    }
}

fn ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
    }
}

#[async_trait]
impl WarehouseSession for PgSession {
    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let connection = self.connection()?;
        let result = Executor::execute(&mut *connection, sqlx::raw_sql(statement.sql()))
            .await
            .map_err(|e| statement_error(statement.table(), &e))?;

        Ok(result.rows_affected())
    }

    async fn query_i64(&mut self, sql: &str) -> Result<IntRows> {
        let connection = self.connection()?;
        let rows = Executor::fetch_all(&mut *connection, sqlx::raw_sql(sql))
            .await
            .map_err(|e| query_error(&e))?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|index| row.try_get::<Option<i64>, _>(index))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| query_error(&e))
            })
            .collect()
    }

    async fn close(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Err(SessionError::Closed);
        };

        connection.close().await.map_err(|e| query_error(&e))?;
        tracing::debug!(warehouse = %self.target, "Closed warehouse session");
        Ok(())
    }
}

/// Opens [`PgSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, cluster: &ClusterConfig) -> Result<PgSession> {
        PgSession::connect(cluster).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_mapping() {
        assert!(matches!(ssl_mode(SslMode::Disable), PgSslMode::Disable));
        assert!(matches!(ssl_mode(SslMode::Prefer), PgSslMode::Prefer));
        assert!(matches!(ssl_mode(SslMode::Require), PgSslMode::Require));
    }

    #[tokio::test]
    async fn test_closed_session_runs_on_spawned_task() {
        let mut session = PgSession {
            connection: None,
            target: "awsuser@localhost:5439/dev (redshift)".to_string(),
        };
        let statement = Statement::new(
            songdwh_core::Table::Users,
            songdwh_core::StatementKind::Insert,
            "SELECT 1",
        );

        let (executed, queried) = tokio::spawn(async move {
            let executed = session.execute(&statement).await;
            let queried = session.query_i64("SELECT 1").await;
            (executed, queried)
        })
        .await
        .unwrap();

        assert!(matches!(executed, Err(SessionError::Closed)));
        assert!(matches!(queried, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_typed() {
        let cluster = ClusterConfig {
            host: "127.0.0.1".to_string(),
            db_name: "dev".to_string(),
            db_user: "awsuser".to_string(),
            db_password: "secret".to_string(),
            // nothing listens on the discard port
            db_port: 9,
            dialect: songdwh_core::Dialect::Postgres,
            ssl_mode: SslMode::Disable,
            connect_timeout_secs: 2,
        };

        match PgSession::connect(&cluster).await {
            Err(SessionError::Connection { target, .. }) => {
                assert_eq!(target, "awsuser@127.0.0.1:9/dev (postgres)");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
