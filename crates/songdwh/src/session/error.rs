//! Session error types and driver error mapping.

use songdwh_core::Table;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by a warehouse session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Failed to connect to {target}: {message}")]
    Connection { target: String, message: String },

    #[error("{message}{}", sqlstate(.code))]
    Statement {
        table: Table,
        message: String,
        code: Option<String>,
    },

    #[error("Query failed: {message}{}", sqlstate(.code))]
    Query {
        message: String,
        code: Option<String>,
    },

    #[error("Session is closed")]
    Closed,
}

impl SessionError {
    /// SQLSTATE reported by the database, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            SessionError::Statement { code, .. } | SessionError::Query { code, .. } => {
                code.as_deref()
            }
            _ => None,
        }
    }
}

fn sqlstate(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(" (SQLSTATE {code})"))
        .unwrap_or_default()
}

/// Message and SQLSTATE of a driver error.
///
/// Database errors keep the server's message; anything else (I/O, protocol,
/// decoding) falls back to the driver's own description.
pub(crate) fn describe(err: &sqlx::Error) -> (String, Option<String>) {
    match err.as_database_error() {
        Some(db) => (db.message().to_string(), db.code().map(|c| c.into_owned())),
        None => (err.to_string(), None),
    }
}

pub(crate) fn statement_error(table: Table, err: &sqlx::Error) -> SessionError {
    let (message, code) = describe(err);
    SessionError::Statement {
        table,
        message,
        code,
    }
}

pub(crate) fn query_error(err: &sqlx::Error) -> SessionError {
    let (message, code) = describe(err);
    SessionError::Query { message, code }
}
