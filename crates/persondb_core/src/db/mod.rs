//! SQLite storage bootstrap and stored-procedure catalog entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections from connection strings.
//! - Keep the procedure catalog (`stored_procedures`) available on every
//!   connection handed out by this module.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and an existing catalog table.
//! - Procedure definitions are data in the database; this module never
//!   interprets them beyond storing and loading their SQL text.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog;
mod open;

pub use catalog::{
    define_procedure, ensure_catalog, ensure_single_statement, install_person_schema,
    list_procedures, procedure_body, PERSON_SCHEMA_SQL,
};
pub use open::{normalize_connection_string, open_connection};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    EmptyConnectionString,
    EmptyProcedureName,
    EmptyProcedureBody { name: String },
    NotSingleStatement { name: String, count: usize },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::EmptyConnectionString => write!(f, "connection string cannot be empty"),
            Self::EmptyProcedureName => write!(f, "procedure name cannot be empty"),
            Self::EmptyProcedureBody { name } => {
                write!(f, "procedure `{name}` has an empty body")
            }
            Self::NotSingleStatement { name, count } => write!(
                f,
                "procedure `{name}` must be a single statement, found {count}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::EmptyConnectionString
            | Self::EmptyProcedureName
            | Self::EmptyProcedureBody { .. }
            | Self::NotSingleStatement { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
