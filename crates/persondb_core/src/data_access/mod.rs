//! Generic stored-procedure gateway.
//!
//! # Responsibility
//! - Execute a named procedure as a command or as a row-returning query.
//! - Bind named parameter records to procedure parameters.
//! - Map result rows into caller-chosen types.
//!
//! # Invariants
//! - The gateway is a pass-through: no validation, retries or caching.
//! - A connection is acquired and released inside every single call.
//! - `None` as connection selector means [`crate::config::DEFAULT_CONNECTION`].

use crate::db::DbError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod params;
mod record;
mod sqlite;

pub use params::{NoParams, ProcedureParams, Value};
pub use record::{FromRecord, Record};
pub use sqlite::SqliteDataAccess;

pub type DataAccessResult<T> = Result<T, DataAccessError>;

/// Single failure category for every gateway call.
///
/// Variants keep the underlying detail for diagnostics; callers are expected
/// to treat any of them as "the procedure call failed".
#[derive(Debug)]
pub enum DataAccessError {
    Sqlite(rusqlite::Error),
    Db(DbError),
    UnknownConnection(String),
    UnknownProcedure(String),
    MissingParameter { procedure: String, parameter: String },
    UnknownParameter { procedure: String, parameter: String },
    MissingColumn(String),
    Conversion { column: String, message: String },
    Worker(String),
}

impl Display for DataAccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownConnection(name) => write!(f, "unknown connection `{name}`"),
            Self::UnknownProcedure(name) => write!(f, "unknown stored procedure `{name}`"),
            Self::MissingParameter {
                procedure,
                parameter,
            } => write!(
                f,
                "procedure `{procedure}` expects parameter `{parameter}` which was not supplied"
            ),
            Self::UnknownParameter {
                procedure,
                parameter,
            } => write!(
                f,
                "procedure `{procedure}` has no parameter named `{parameter}`"
            ),
            Self::MissingColumn(column) => write!(f, "result set has no column `{column}`"),
            Self::Conversion { column, message } => {
                write!(f, "invalid value in column `{column}`: {message}")
            }
            Self::Worker(message) => write!(f, "database worker failed: {message}"),
        }
    }
}

impl Error for DataAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DataAccessError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<DbError> for DataAccessError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Stored-procedure execution contract consumed by repositories.
#[async_trait]
pub trait SqlDataAccess: Send + Sync {
    /// Runs `procedure` as a mutating command.
    async fn save_data(
        &self,
        procedure: &str,
        params: &dyn ProcedureParams,
        connection: Option<&str>,
    ) -> DataAccessResult<()>;

    /// Runs `procedure` and returns its raw result rows.
    async fn load_records(
        &self,
        procedure: &str,
        params: &dyn ProcedureParams,
        connection: Option<&str>,
    ) -> DataAccessResult<Vec<Record>>;

    /// Runs `procedure` and maps every result row into `T`.
    async fn get_data<T>(
        &self,
        procedure: &str,
        params: &dyn ProcedureParams,
        connection: Option<&str>,
    ) -> DataAccessResult<Vec<T>>
    where
        T: FromRecord + Send,
    {
        let records = self.load_records(procedure, params, connection).await?;
        records.iter().map(T::from_record).collect()
    }
}
