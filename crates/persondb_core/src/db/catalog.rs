//! Stored-procedure catalog kept inside each SQLite database.
//!
//! # Responsibility
//! - Create the `stored_procedures` table on demand.
//! - Store and load procedure SQL by name.
//! - Provision the bundled Person schema and its procedures.
//!
//! # Invariants
//! - A procedure is exactly one SQL statement; parameters are SQLite named
//!   parameters (`@Name`, `:Name` or `$Name`).
//! - Names are unique; defining an existing name replaces its body.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{params, Batch, Connection, OptionalExtension};

/// Person table plus `sp_create_person`, `sp_update_person`,
/// `sp_delete_person`, `sp_get_person` and `sp_get_people`.
pub const PERSON_SCHEMA_SQL: &str = include_str!("person_schema.sql");

const CATALOG_SQL: &str = "CREATE TABLE IF NOT EXISTS stored_procedures (
    name TEXT PRIMARY KEY NOT NULL,
    body TEXT NOT NULL
);";

/// Creates the catalog table when it does not exist yet.
pub fn ensure_catalog(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CATALOG_SQL)?;
    Ok(())
}

/// Stores `body` under `name`, replacing any previous definition.
pub fn define_procedure(conn: &Connection, name: &str, body: &str) -> DbResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DbError::EmptyProcedureName);
    }
    let body = body.trim();
    if body.is_empty() {
        return Err(DbError::EmptyProcedureBody {
            name: name.to_string(),
        });
    }

    ensure_single_statement(conn, name, body)?;

    conn.execute(
        "INSERT OR REPLACE INTO stored_procedures (name, body) VALUES (?1, ?2);",
        params![name, body],
    )?;
    Ok(())
}

/// Rejects `body` unless it compiles to exactly one statement.
///
/// `Connection::prepare` only compiles the first statement of a body, so a
/// trailing statement would otherwise be skipped without an error.
pub fn ensure_single_statement(conn: &Connection, name: &str, body: &str) -> DbResult<()> {
    let mut batch = Batch::new(conn, body);
    let mut count = 0;
    while batch.next()?.is_some() {
        count += 1;
    }
    if count != 1 {
        return Err(DbError::NotSingleStatement {
            name: name.to_string(),
            count,
        });
    }
    Ok(())
}

/// Loads the SQL body of procedure `name`, or `None` when it is not defined.
pub fn procedure_body(conn: &Connection, name: &str) -> DbResult<Option<String>> {
    let body = conn
        .query_row(
            "SELECT body FROM stored_procedures WHERE name = ?1;",
            [name],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(body)
}

/// Lists defined procedure names in ascending order.
pub fn list_procedures(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM stored_procedures ORDER BY name ASC;")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

/// Installs the Person table and procedures atomically.
pub fn install_person_schema(conn: &mut Connection) -> DbResult<()> {
    ensure_catalog(conn)?;
    let tx = conn.transaction()?;
    tx.execute_batch(PERSON_SCHEMA_SQL)?;
    tx.commit()?;
    info!("event=schema_install module=db status=ok schema=person");
    Ok(())
}
