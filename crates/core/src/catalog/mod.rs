//! The query catalog: every SQL statement the pipeline runs, in execution order.
//!
//! A [`QueryCatalog`] is built once from a [`WarehouseConfig`] and then only
//! read. Both jobs take their statements from it.

mod dialect;
mod error;
mod queries;
mod schema;
mod statement;
mod table;

pub use dialect::Dialect;
pub use error::{CatalogError, Result};
pub use schema::{create_table_sql, drop_table_sql};
pub use statement::{quote_literal, unquote, Binding, Statement, StatementKind};
pub use table::Table;

use crate::config::WarehouseConfig;
use crate::verify::{self, VerificationQuery};

/// Fact table first, then the tables it references.
pub const DROP_ORDER: [Table; 7] = [
    Table::StagingEvents,
    Table::StagingSongs,
    Table::Songplays,
    Table::Users,
    Table::Songs,
    Table::Artists,
    Table::Time,
];

/// Referenced tables first, fact table last.
pub const CREATE_ORDER: [Table; 7] = [
    Table::StagingEvents,
    Table::StagingSongs,
    Table::Users,
    Table::Artists,
    Table::Songs,
    Table::Time,
    Table::Songplays,
];

pub const COPY_ORDER: [Table; 2] = [Table::StagingEvents, Table::StagingSongs];

pub const INSERT_ORDER: [Table; 5] = [
    Table::Songplays,
    Table::Users,
    Table::Songs,
    Table::Artists,
    Table::Time,
];

/// Ordered drop, create, copy and insert statements for one configuration.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    dialect: Dialect,
    drop: Vec<Statement>,
    create: Vec<Statement>,
    copy: Result<Vec<Statement>>,
    insert: Vec<Statement>,
}

impl QueryCatalog {
    /// Builds every statement up front.
    ///
    /// Copy statements need the optional `[S3]` and `[IAM_ROLE]` settings and
    /// a dialect that can bulk-load. When they cannot be built the error is
    /// kept and returned by [`QueryCatalog::copy_statements`], so the schema
    /// job still works with a cluster-only configuration.
    pub fn new(config: &WarehouseConfig) -> Self {
        let dialect = config.cluster.dialect;

        let drop = DROP_ORDER
            .iter()
            .map(|&table| Statement::new(table, StatementKind::Drop, drop_table_sql(table)))
            .collect();

        let create = CREATE_ORDER
            .iter()
            .map(|&table| {
                Statement::new(
                    table,
                    StatementKind::Create,
                    create_table_sql(table, dialect),
                )
            })
            .collect();

        Self {
            dialect,
            drop,
            create,
            copy: queries::copy_statements(config),
            insert: queries::insert_statements(config),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn drop_statements(&self) -> &[Statement] {
        &self.drop
    }

    pub fn create_statements(&self) -> &[Statement] {
        &self.create
    }

    pub fn copy_statements(&self) -> Result<&[Statement]> {
        match &self.copy {
            Ok(statements) => Ok(statements),
            Err(err) => Err(err.clone()),
        }
    }

    pub fn insert_statements(&self) -> &[Statement] {
        &self.insert
    }

    /// Read-only queries checking the loaded star schema.
    pub fn verification_queries(&self) -> Vec<VerificationQuery> {
        verify::verification_queries()
    }
}
