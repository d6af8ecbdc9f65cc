//! Named parameter records.

pub use rusqlite::types::Value;

/// A structured argument whose fields bind to procedure parameters by name.
///
/// Names are given without the SQL sigil: a field named `Email` binds to the
/// procedure parameter `@Email` (or `:Email` / `$Email`).
pub trait ProcedureParams: Send + Sync {
    fn bind(&self) -> Vec<(&'static str, Value)>;
}

/// Parameter record for procedures that take no arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

impl ProcedureParams for NoParams {
    fn bind(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}
