//! SQLite-backed gateway.
//!
//! Every call resolves its connection string, then opens, uses and drops a
//! connection on a blocking worker thread. Nothing is pooled or cached here.

use super::{
    DataAccessError, DataAccessResult, ProcedureParams, Record, SqlDataAccess, Value,
};
use crate::config::{ConnectionStrings, DEFAULT_CONNECTION};
use crate::db::{ensure_single_statement, open_connection, procedure_body};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{Connection, Statement};
use std::sync::Arc;
use std::time::Instant;

const PARAMETER_SIGILS: [char; 3] = ['@', ':', '$'];

type Bindings = Vec<(&'static str, Value)>;

#[derive(Debug, Clone, Copy)]
enum CallKind {
    Command,
    Query,
}

impl CallKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Query => "query",
        }
    }
}

/// Gateway executing catalog procedures against configured SQLite databases.
#[derive(Debug, Clone)]
pub struct SqliteDataAccess {
    connections: Arc<ConnectionStrings>,
}

impl SqliteDataAccess {
    /// Creates a gateway over `connections`.
    ///
    /// Each call opens its own connection, so a `:memory:` entry yields a
    /// fresh empty database per call and cannot serve procedures here.
    pub fn new(connections: ConnectionStrings) -> Self {
        Self {
            connections: Arc::new(connections),
        }
    }

    pub fn connections(&self) -> &ConnectionStrings {
        &self.connections
    }

    fn connection_string(&self, selector: Option<&str>) -> DataAccessResult<String> {
        self.connections
            .resolve(selector)
            .map(str::to_string)
            .ok_or_else(|| {
                DataAccessError::UnknownConnection(
                    selector.unwrap_or(DEFAULT_CONNECTION).to_string(),
                )
            })
    }

    async fn run<T, F>(
        &self,
        kind: CallKind,
        procedure: &str,
        params: &dyn ProcedureParams,
        selector: Option<&str>,
        work: F,
    ) -> DataAccessResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str, &Bindings) -> DataAccessResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        let selector_name = selector.unwrap_or(DEFAULT_CONNECTION);

        let result = match self.connection_string(selector) {
            Ok(connection_string) => {
                let procedure_name = procedure.to_string();
                let bindings = params.bind();
                tokio::task::spawn_blocking(move || {
                    let conn = open_connection(&connection_string)?;
                    work(&conn, &procedure_name, &bindings)
                })
                .await
                .unwrap_or_else(|err| Err(DataAccessError::Worker(err.to_string())))
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => debug!(
                "event=procedure_call module=data_access status=ok kind={} procedure={} connection={} duration_ms={}",
                kind.as_str(),
                procedure,
                selector_name,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=procedure_call module=data_access status=error kind={} procedure={} connection={} duration_ms={} error={}",
                kind.as_str(),
                procedure,
                selector_name,
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }
}

#[async_trait]
impl SqlDataAccess for SqliteDataAccess {
    async fn save_data(
        &self,
        procedure: &str,
        params: &dyn ProcedureParams,
        connection: Option<&str>,
    ) -> DataAccessResult<()> {
        self.run(
            CallKind::Command,
            procedure,
            params,
            connection,
            |conn, procedure, bindings| {
                let mut stmt = prepare_procedure(conn, procedure, bindings)?;
                stmt.raw_execute()?;
                Ok(())
            },
        )
        .await
    }

    async fn load_records(
        &self,
        procedure: &str,
        params: &dyn ProcedureParams,
        connection: Option<&str>,
    ) -> DataAccessResult<Vec<Record>> {
        self.run(
            CallKind::Query,
            procedure,
            params,
            connection,
            |conn, procedure, bindings| {
                let mut stmt = prepare_procedure(conn, procedure, bindings)?;
                let names = stmt
                    .column_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>();

                let mut rows = stmt.raw_query();
                let mut records = Vec::new();
                while let Some(row) = rows.next()? {
                    records.push(Record::from_row(row, &names)?);
                }
                Ok(records)
            },
        )
        .await
    }
}

fn prepare_procedure<'conn>(
    conn: &'conn Connection,
    procedure: &str,
    bindings: &Bindings,
) -> DataAccessResult<Statement<'conn>> {
    let body = procedure_body(conn, procedure)?
        .ok_or_else(|| DataAccessError::UnknownProcedure(procedure.to_string()))?;
    // Catalog rows can be written with plain SQL, bypassing `define_procedure`.
    ensure_single_statement(conn, procedure, &body)?;
    let mut stmt = conn.prepare(&body)?;
    bind_parameters(&mut stmt, procedure, bindings)?;
    Ok(stmt)
}

/// Binds every supplied value by name and requires every declared parameter
/// to receive one. A name declared with several sigils binds all of them.
fn bind_parameters(
    stmt: &mut Statement<'_>,
    procedure: &str,
    bindings: &Bindings,
) -> DataAccessResult<()> {
    let mut bound = vec![false; stmt.parameter_count()];

    for (name, value) in bindings {
        let indexes = parameter_indexes(stmt, name)?;
        if indexes.is_empty() {
            return Err(DataAccessError::UnknownParameter {
                procedure: procedure.to_string(),
                parameter: (*name).to_string(),
            });
        }
        for index in indexes {
            stmt.raw_bind_parameter(index, value)?;
            bound[index - 1] = true;
        }
    }

    if let Some(offset) = bound.iter().position(|is_bound| !is_bound) {
        let index = offset + 1;
        let parameter = stmt
            .parameter_name(index)
            .map(|name| name.trim_start_matches(PARAMETER_SIGILS).to_string())
            .unwrap_or_else(|| format!("?{index}"));
        return Err(DataAccessError::MissingParameter {
            procedure: procedure.to_string(),
            parameter,
        });
    }

    Ok(())
}

fn parameter_indexes(stmt: &Statement<'_>, name: &str) -> DataAccessResult<Vec<usize>> {
    let mut indexes = Vec::new();
    for sigil in PARAMETER_SIGILS {
        if let Some(index) = stmt.parameter_index(&format!("{sigil}{name}"))? {
            indexes.push(index);
        }
    }
    Ok(indexes)
}
