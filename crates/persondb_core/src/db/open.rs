//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Turn a configured connection string into an open SQLite connection.
//! - Configure connection pragmas required by core behavior.
//! - Make sure the procedure catalog exists before returning a connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections can look up procedures by name.

use super::catalog::ensure_catalog;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::{Duration, Instant};

const MEMORY_CONNECTION: &str = ":memory:";
const SQLITE_URL_PREFIX: &str = "sqlite://";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Strips surrounding whitespace and an optional `sqlite://` scheme.
///
/// `file:` URIs and `:memory:` are passed through untouched.
pub fn normalize_connection_string(connection_string: &str) -> DbResult<&str> {
    let trimmed = connection_string.trim();
    let normalized = trimmed
        .strip_prefix(SQLITE_URL_PREFIX)
        .unwrap_or(trimmed)
        .trim();
    if normalized.is_empty() {
        return Err(DbError::EmptyConnectionString);
    }
    Ok(normalized)
}

/// Opens the SQLite database named by `connection_string`.
///
/// # Side effects
/// - Creates the database file when it does not exist yet.
/// - Creates the procedure catalog table when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_connection(connection_string: &str) -> DbResult<Connection> {
    let started_at = Instant::now();
    let target = normalize_connection_string(connection_string)?;
    let mode = if target == MEMORY_CONNECTION {
        "memory"
    } else {
        "file"
    };

    let conn = match open_target(target) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn open_target(target: &str) -> rusqlite::Result<Connection> {
    if target == MEMORY_CONNECTION {
        Connection::open_in_memory()
    } else {
        // `Connection::open` understands `file:` URIs because rusqlite enables
        // SQLITE_OPEN_URI by default.
        Connection::open(target)
    }
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    ensure_catalog(conn)?;
    Ok(())
}
