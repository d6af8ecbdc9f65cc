use persondb_core::db::{define_procedure, install_person_schema, open_connection, DbError};
use persondb_core::{
    ConnectionStrings, DataAccessError, NoParams, Person, PersonRepository, ProcedureParams,
    Record, SqlDataAccess, SqlPersonRepository, SqliteDataAccess, Value,
};
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    gateway: SqliteDataAccess,
}

/// Two provisioned databases: `conn` (default) and `archive`.
fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let main_db = dir.path().join("people.db");
    let archive_db = dir.path().join("archive.db");
    provision(&main_db);
    provision(&archive_db);

    let connections = ConnectionStrings::new()
        .with_connection("conn", main_db.to_str().unwrap())
        .with_connection("archive", archive_db.to_str().unwrap());

    Fixture {
        _dir: dir,
        gateway: SqliteDataAccess::new(connections),
    }
}

fn provision(path: &Path) {
    let mut conn = open_connection(path.to_str().unwrap()).unwrap();
    install_person_schema(&mut conn).unwrap();
}

struct NameParam(&'static str);

impl ProcedureParams for NameParam {
    fn bind(&self) -> Vec<(&'static str, Value)> {
        vec![("Name", Value::Text(self.0.to_string()))]
    }
}

#[tokio::test]
async fn repository_round_trip_against_sqlite() {
    let fx = fixture();
    let repo = SqlPersonRepository::new(fx.gateway.clone());

    assert!(repo.add(&Person::new("ada", "ada@example.com").with_address("London")).await);
    assert!(repo.add(&Person::new("grace", "grace@example.com")).await);

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "ada");
    assert_eq!(all[0].address.as_deref(), Some("London"));
    assert_eq!(all[1].address, None);
    assert!(all.iter().all(Person::is_persisted));

    let mut grace = repo.get_by_id(all[1].id).await.unwrap().unwrap();
    grace.address = Some("Arlington".to_string());
    assert!(repo.update(&grace).await);
    assert_eq!(repo.get_by_id(grace.id).await.unwrap(), Some(grace.clone()));

    assert!(repo.delete(all[0].id).await);
    assert_eq!(repo.get_by_id(all[0].id).await.unwrap(), None);
    assert_eq!(repo.get_all().await.unwrap(), vec![grace]);
}

#[tokio::test]
async fn add_ignores_caller_supplied_id() {
    let fx = fixture();
    let repo = SqlPersonRepository::new(fx.gateway.clone());

    assert!(repo.add(&Person::new("ada", "ada@example.com").with_id(99)).await);

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 1);
}

#[tokio::test]
async fn constraint_violation_degrades_to_false() {
    let fx = fixture();
    let repo = SqlPersonRepository::new(fx.gateway.clone());

    assert!(!repo.add(&Person::new("   ", "blank@example.com")).await);
    assert!(matches!(
        repo.try_add(&Person::new("ada", "")).await,
        Err(DataAccessError::Sqlite(_))
    ));
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn connection_selector_routes_to_separate_databases() {
    let fx = fixture();
    let main = SqlPersonRepository::new(fx.gateway.clone());
    let archive = SqlPersonRepository::new(fx.gateway.clone()).with_connection("archive");

    assert!(archive.add(&Person::new("old", "old@example.com")).await);

    assert!(main.get_all().await.unwrap().is_empty());
    assert_eq!(archive.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_connection_fails_reads_and_writes() {
    let fx = fixture();
    let repo = SqlPersonRepository::new(fx.gateway.clone()).with_connection("reporting");

    assert!(!repo.delete(1).await);
    assert!(matches!(
        repo.get_all().await,
        Err(DataAccessError::UnknownConnection(name)) if name == "reporting"
    ));
}

#[tokio::test]
async fn unknown_procedure_is_reported() {
    let fx = fixture();

    let err = fx
        .gateway
        .save_data("sp_missing", &NoParams, None)
        .await
        .unwrap_err();

    assert!(matches!(err, DataAccessError::UnknownProcedure(name) if name == "sp_missing"));
}

#[tokio::test]
async fn procedure_parameter_without_value_is_reported() {
    let fx = fixture();

    let err = fx
        .gateway
        .save_data("sp_create_person", &NameParam("ada"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DataAccessError::MissingParameter { procedure, parameter }
            if procedure == "sp_create_person" && parameter == "Email"
    ));
}

#[tokio::test]
async fn value_without_matching_parameter_is_reported() {
    let fx = fixture();

    let err = fx
        .gateway
        .load_records("sp_get_people", &NameParam("ada"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DataAccessError::UnknownParameter { parameter, .. } if parameter == "Name"
    ));
}

#[tokio::test]
async fn multi_statement_procedure_is_rejected() {
    let fx = fixture();
    let repo = SqlPersonRepository::new(fx.gateway.clone());
    assert!(repo.add(&Person::new("ada", "ada@example.com")).await);
    {
        let conn = open_connection(fx.gateway.connections().get("conn").unwrap()).unwrap();
        assert!(matches!(
            define_procedure(&conn, "sp_wipe", "SELECT 1 AS One; DELETE FROM people"),
            Err(DbError::NotSingleStatement { count: 2, .. })
        ));
        conn.execute(
            "INSERT INTO stored_procedures (name, body) \
             VALUES ('sp_wipe', 'SELECT 1 AS One; DELETE FROM people');",
            [],
        )
        .unwrap();
    }

    let err = fx
        .gateway
        .load_records("sp_wipe", &NoParams, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DataAccessError::Db(DbError::NotSingleStatement { name, count: 2 }) if name == "sp_wipe"
    ));

    let err = fx.gateway.save_data("sp_wipe", &NoParams, None).await.unwrap_err();
    assert!(matches!(err, DataAccessError::Db(DbError::NotSingleStatement { .. })));
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn in_memory_database_does_not_outlive_a_call() {
    let gateway = SqliteDataAccess::new(ConnectionStrings::single(":memory:"));

    let err = gateway
        .load_records("sp_get_people", &NoParams, None)
        .await
        .unwrap_err();

    assert!(matches!(err, DataAccessError::UnknownProcedure(name) if name == "sp_get_people"));
}

#[tokio::test]
async fn colon_and_dollar_parameters_bind_by_name() {
    let fx = fixture();
    {
        let conn = open_connection(fx.gateway.connections().get("conn").unwrap()).unwrap();
        define_procedure(
            &conn,
            "sp_echo",
            "SELECT :Name AS Greeting, $Name AS Again, 7 AS Answer",
        )
        .unwrap();
    }

    let rows: Vec<Record> = fx
        .gateway
        .get_data("sp_echo", &NameParam("ada"), Some("conn"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get::<String>("greeting").unwrap(), "ada");
    assert_eq!(rows[0].get::<String>("Again").unwrap(), "ada");
    assert_eq!(rows[0].get::<i64>("Answer").unwrap(), 7);
}

#[tokio::test]
async fn concurrent_callers_share_one_gateway() {
    let fx = fixture();
    let mut handles = Vec::new();
    for index in 0..8 {
        let gateway = fx.gateway.clone();
        handles.push(tokio::spawn(async move {
            let repo = SqlPersonRepository::new(gateway);
            let person = Person::new(format!("p{index}"), format!("p{index}@example.com"));
            repo.add(&person).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    let repo = SqlPersonRepository::new(fx.gateway.clone());
    assert_eq!(repo.get_all().await.unwrap().len(), 8);
}

#[test]
fn reopening_a_provisioned_database_keeps_its_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.db");
    provision(&path);
    {
        let conn = open_connection(path.to_str().unwrap()).unwrap();
        conn.execute(
            "INSERT INTO people (Name, Email) VALUES ('ada', 'ada@example.com');",
            [],
        )
        .unwrap();
    }

    provision(&path);

    let conn = open_connection(path.to_str().unwrap()).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM people;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
