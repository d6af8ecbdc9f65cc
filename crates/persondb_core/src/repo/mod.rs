//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Keep procedure names and parameter shapes out of callers.
//!
//! # Invariants
//! - Repositories talk to storage only through `SqlDataAccess`.

pub mod person_repo;
