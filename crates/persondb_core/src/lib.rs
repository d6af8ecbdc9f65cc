//! Stored-procedure data access for Person records.
//!
//! `data_access` runs named procedures; `repo` maps Person use cases onto them.

pub mod config;
pub mod data_access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, ConnectionStrings, DEFAULT_CONNECTION};
pub use data_access::{
    DataAccessError, DataAccessResult, FromRecord, NoParams, ProcedureParams, Record,
    SqlDataAccess, SqliteDataAccess, Value,
};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::person::{Person, PersonId, PersonValidationError};
pub use repo::person_repo::{PersonRepository, SqlPersonRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, DEFAULT_CONNECTION};

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(DEFAULT_CONNECTION, "conn");
    }
}
