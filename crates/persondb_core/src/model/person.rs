//! Person domain model.
//!
//! # Responsibility
//! - Define the single persisted entity and its wire/row field names.
//! - Describe required-field rules for callers that enforce them.
//!
//! # Invariants
//! - `id` is assigned by the database; `0` means "not persisted yet".
//! - `name` and `email` must be non-blank before create/update is issued.
//!   The repository does not enforce this; callers run `validate()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Database-assigned surrogate key.
pub type PersonId = i32;

/// Person record as stored in the `people` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    #[serde(default)]
    pub id: PersonId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Required-field violations reported by [`Person::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonValidationError {
    EmptyName,
    EmptyEmail,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "person name is required"),
            Self::EmptyEmail => write!(f, "person email is required"),
        }
    }
}

impl Error for PersonValidationError {}

impl Person {
    /// Creates an unsaved person (`id == 0`, no address).
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            address: None,
        }
    }

    pub fn with_id(mut self, id: PersonId) -> Self {
        self.id = id;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns whether the database has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Checks required fields. Whitespace-only values count as missing.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.name.trim().is_empty() {
            return Err(PersonValidationError::EmptyName);
        }
        if self.email.trim().is_empty() {
            return Err(PersonValidationError::EmptyEmail);
        }
        Ok(())
    }
}
