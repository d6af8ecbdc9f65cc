//! Domain model.
//!
//! # Responsibility
//! - Define the data structures passed into and returned from repositories.
//!
//! # Invariants
//! - Model values are plain data; repositories never retain them.

pub mod person;
