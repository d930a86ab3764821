//! songdwh - load song-play event logs into a star-schema warehouse.
//!
//! The imperative shell around `songdwh_core`: configuration loading, the
//! warehouse session, the batch runner, the two jobs and the command line.

pub mod cli;
pub mod config;
pub mod jobs;
pub mod prelude;
pub mod runner;
pub mod session;

pub use config::{load_config, LoadConfigError};
pub use jobs::{JobError, JobOptions, JobOutcome};
pub use session::{Connector, PgSession, RecordingSession, SessionError, WarehouseSession};
