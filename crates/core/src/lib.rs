//! songdwh_core - pure building blocks of the song-play warehouse pipeline.
//!
//! Nothing in this crate performs I/O. It turns configuration into ordered SQL
//! statements, aggregates statement outcomes into reports, and evaluates
//! verification results. The `songdwh` crate owns the warehouse session and
//! the binaries.

pub mod catalog;
pub mod config;
pub mod plan;
pub mod report;
pub mod time;
pub mod verify;

pub use catalog::{
    Binding, CatalogError, Dialect, QueryCatalog, Statement, StatementKind, Table,
};
pub use config::{
    ClusterConfig, ConfigError, EtlConfig, IamRoleConfig, RawConfig, S3Config, SslMode,
    WarehouseConfig,
};
pub use report::{
    BatchReport, ExitStatus, FailurePolicy, RunSummary, StatementOutcome, StatementReport,
};
pub use time::{TimeParts, TimestampUnit};
pub use verify::{Check, Finding, Severity, VerificationQuery, VerificationReport};
