//! Result rows detached from their statement.

use super::{DataAccessError, DataAccessResult, Value};
use rusqlite::types::{FromSql, ValueRef};
use rusqlite::Row;

/// One result row as ordered `(column, value)` pairs.
///
/// Column lookup ignores ASCII case, the way SQL engines treat identifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Converts `column` into `T`.
    ///
    /// # Errors
    /// - `MissingColumn` when the row has no such column.
    /// - `Conversion` when the stored value does not fit `T`.
    pub fn get<T: FromSql>(&self, column: &str) -> DataAccessResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| DataAccessError::MissingColumn(column.to_string()))?;
        T::column_result(ValueRef::from(value)).map_err(|err| DataAccessError::Conversion {
            column: column.to_string(),
            message: err.to_string(),
        })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn from_row(row: &Row<'_>, names: &[String]) -> rusqlite::Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            columns.push((name.clone(), row.get::<_, Value>(index)?));
        }
        Ok(Self { columns })
    }
}

/// Builds a typed value from one result row.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> DataAccessResult<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> DataAccessResult<Self> {
        Ok(record.clone())
    }
}
