//! Warehouse sessions.
//!
//! [`WarehouseSession`] is the only way the jobs reach the warehouse.
//! [`PgSession`] talks to Redshift or Postgres; [`RecordingSession`] keeps
//! everything in memory for tests.

mod error;
mod memory;
mod postgres;

pub use error::{Result, SessionError};
pub use memory::RecordingSession;
pub use postgres::{PgConnector, PgSession};

use async_trait::async_trait;
use songdwh_core::{ClusterConfig, Statement};

/// Rows of a query whose columns are all integers.
pub type IntRows = Vec<Vec<Option<i64>>>;

/// An open session on the warehouse.
#[async_trait]
pub trait WarehouseSession: Send {
    /// Runs one statement in its own transaction. Returns rows affected.
    async fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Runs a read-only query whose columns are all integers.
    async fn query_i64(&mut self, sql: &str) -> Result<IntRows>;

    /// Ends the session. Later calls fail with [`SessionError::Closed`].
    async fn close(&mut self) -> Result<()>;
}

/// Opens sessions from cluster settings.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: WarehouseSession;

    async fn connect(&self, cluster: &ClusterConfig) -> Result<Self::Session>;
}
