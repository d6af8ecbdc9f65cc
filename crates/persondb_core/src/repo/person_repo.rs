//! Person repository contract and stored-procedure implementation.
//!
//! # Responsibility
//! - Map the five Person use cases onto fixed procedure names.
//! - Shape gateway results into boolean / optional / sequence outcomes.
//!
//! # Invariants
//! - Write operations never return an error: any gateway failure becomes
//!   `false`, and the cause is logged.
//! - Read operations propagate gateway failures unchanged.
//! - The repository keeps no state besides its gateway and selector.

use crate::config::DEFAULT_CONNECTION;
use crate::data_access::{
    DataAccessResult, FromRecord, NoParams, ProcedureParams, Record, SqlDataAccess, Value,
};
use crate::model::person::{Person, PersonId};
use async_trait::async_trait;
use log::{info, warn};

pub const SP_CREATE_PERSON: &str = "sp_create_person";
pub const SP_UPDATE_PERSON: &str = "sp_update_person";
pub const SP_DELETE_PERSON: &str = "sp_delete_person";
pub const SP_GET_PERSON: &str = "sp_get_person";
pub const SP_GET_PEOPLE: &str = "sp_get_people";

/// Parameters of `sp_create_person`; the id is left to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatePersonParams<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: Option<&'a str>,
}

impl<'a> From<&'a Person> for CreatePersonParams<'a> {
    fn from(person: &'a Person) -> Self {
        Self {
            name: person.name.as_str(),
            email: person.email.as_str(),
            address: person.address.as_deref(),
        }
    }
}

impl ProcedureParams for CreatePersonParams<'_> {
    fn bind(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Name", Value::from(self.name.to_string())),
            ("Email", Value::from(self.email.to_string())),
            ("Address", Value::from(self.address.map(str::to_string))),
        ]
    }
}

/// Parameters of `sp_delete_person` and `sp_get_person`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonIdParams {
    pub id: PersonId,
}

impl ProcedureParams for PersonIdParams {
    fn bind(&self) -> Vec<(&'static str, Value)> {
        vec![("Id", Value::from(self.id))]
    }
}

/// The full record is the parameter set of `sp_update_person`.
impl ProcedureParams for Person {
    fn bind(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Id", Value::from(self.id)),
            ("Name", Value::from(self.name.clone())),
            ("Email", Value::from(self.email.clone())),
            ("Address", Value::from(self.address.clone())),
        ]
    }
}

impl FromRecord for Person {
    fn from_record(record: &Record) -> DataAccessResult<Self> {
        Ok(Self {
            id: record.get("Id")?,
            name: record.get("Name")?,
            email: record.get("Email")?,
            address: record.get("Address")?,
        })
    }
}

/// Repository interface consumed by the web layer.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Creates `person`; its `id` is ignored. Returns `false` on any failure.
    async fn add(&self, person: &Person) -> bool;
    /// Overwrites the stored record with `person.id`. Returns `false` on any failure.
    async fn update(&self, person: &Person) -> bool;
    /// Removes the record with `id`. Returns `false` on any failure.
    async fn delete(&self, id: PersonId) -> bool;
    /// First row returned for `id`, or `None` when there is none.
    async fn get_by_id(&self, id: PersonId) -> DataAccessResult<Option<Person>>;
    async fn get_all(&self) -> DataAccessResult<Vec<Person>>;
}

/// Person repository over any stored-procedure gateway.
pub struct SqlPersonRepository<D> {
    data_access: D,
    connection: String,
}

impl<D: SqlDataAccess> SqlPersonRepository<D> {
    /// Creates a repository using the default connection selector.
    pub fn new(data_access: D) -> Self {
        Self {
            data_access,
            connection: DEFAULT_CONNECTION.to_string(),
        }
    }

    /// Routes every call through connection `name` instead of the default.
    pub fn with_connection(mut self, name: impl Into<String>) -> Self {
        self.connection = name.into();
        self
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn data_access(&self) -> &D {
        &self.data_access
    }

    /// Same as [`PersonRepository::add`] but keeps the failure cause.
    pub async fn try_add(&self, person: &Person) -> DataAccessResult<()> {
        self.data_access
            .save_data(
                SP_CREATE_PERSON,
                &CreatePersonParams::from(person),
                Some(self.connection.as_str()),
            )
            .await
    }

    /// Same as [`PersonRepository::update`] but keeps the failure cause.
    pub async fn try_update(&self, person: &Person) -> DataAccessResult<()> {
        self.data_access
            .save_data(SP_UPDATE_PERSON, person, Some(self.connection.as_str()))
            .await
    }

    /// Same as [`PersonRepository::delete`] but keeps the failure cause.
    pub async fn try_delete(&self, id: PersonId) -> DataAccessResult<()> {
        self.data_access
            .save_data(
                SP_DELETE_PERSON,
                &PersonIdParams { id },
                Some(self.connection.as_str()),
            )
            .await
    }
}

#[async_trait]
impl<D: SqlDataAccess> PersonRepository for SqlPersonRepository<D> {
    async fn add(&self, person: &Person) -> bool {
        write_outcome("add", self.try_add(person).await)
    }

    async fn update(&self, person: &Person) -> bool {
        write_outcome("update", self.try_update(person).await)
    }

    async fn delete(&self, id: PersonId) -> bool {
        write_outcome("delete", self.try_delete(id).await)
    }

    async fn get_by_id(&self, id: PersonId) -> DataAccessResult<Option<Person>> {
        let people: Vec<Person> = self
            .data_access
            .get_data(
                SP_GET_PERSON,
                &PersonIdParams { id },
                Some(self.connection.as_str()),
            )
            .await?;
        Ok(people.into_iter().next())
    }

    async fn get_all(&self) -> DataAccessResult<Vec<Person>> {
        self.data_access
            .get_data(SP_GET_PEOPLE, &NoParams, Some(self.connection.as_str()))
            .await
    }
}

fn write_outcome(operation: &str, result: DataAccessResult<()>) -> bool {
    match result {
        Ok(()) => {
            info!("event=person_write module=repo status=ok op={operation}");
            true
        }
        Err(err) => {
            // Callers only see `false`; the log line keeps the cause.
            warn!("event=person_write module=repo status=error op={operation} error={err}");
            false
        }
    }
}
