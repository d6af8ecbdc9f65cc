//! `persondb` command-line entry point.
//!
//! # Responsibility
//! - Provision a database with the Person procedures.
//! - Drive the Person repository from a shell, printing JSON for reads.

use clap::{Args, Parser, Subcommand};
use log::info;
use persondb_core::db::{install_person_schema, open_connection, DbError};
use persondb_core::{
    core_version, default_log_level, init_logging, init_stderr_logging, ConfigError,
    ConnectionStrings, DataAccessError, Person, PersonId, PersonRepository,
    PersonValidationError, SqlPersonRepository, SqliteDataAccess, DEFAULT_CONNECTION,
};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

const STDERR_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "persondb", version, about = "Person records over stored procedures")]
struct Cli {
    /// JSON file with connection strings (`{"ConnectionStrings": {...}}`).
    #[arg(long, conflicts_with = "database")]
    config: Option<PathBuf>,

    /// SQLite database used as the default connection.
    #[arg(long)]
    database: Option<String>,

    /// Connection selector to use.
    #[arg(long, default_value = DEFAULT_CONNECTION)]
    connection: String,

    /// Absolute directory for rotating log files; logs go to stderr otherwise.
    #[arg(long)]
    log_dir: Option<String>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the Person table and procedures.
    Init,
    Add(PersonArgs),
    Update {
        #[arg(long)]
        id: PersonId,
        #[command(flatten)]
        person: PersonArgs,
    },
    Delete {
        #[arg(long)]
        id: PersonId,
    },
    Get {
        #[arg(long)]
        id: PersonId,
    },
    List,
    Version,
}

#[derive(Debug, Args)]
struct PersonArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: Option<String>,
}

impl PersonArgs {
    fn into_person(self, id: PersonId) -> Result<Person, CliError> {
        let person = Person {
            id,
            name: self.name,
            email: self.email,
            address: self.address,
        };
        person.validate()?;
        Ok(person)
    }
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Config(ConfigError),
    NoDatabase,
    UnknownConnection(String),
    Db(DbError),
    DataAccess(DataAccessError),
    Validation(PersonValidationError),
    Json(serde_json::Error),
    WriteFailed(&'static str),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "{message}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::NoDatabase => write!(f, "either --config or --database is required"),
            Self::UnknownConnection(name) => write!(f, "no connection named `{name}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DataAccess(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            // The repository reports writes as a bare boolean.
            Self::WriteFailed(operation) => write!(f, "{operation} failed"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<DataAccessError> for CliError {
    fn from(value: DataAccessError) -> Self {
        Self::DataAccess(value)
    }
}

impl From<PersonValidationError> for CliError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    start_logging(&cli)?;

    if let Command::Version = cli.command {
        println!("persondb_core version={}", core_version());
        return Ok(());
    }

    let connections = load_connections(&cli)?;
    if connections.get(&cli.connection).is_none() {
        return Err(CliError::UnknownConnection(cli.connection));
    }

    if let Command::Init = cli.command {
        return init_database(&connections, &cli.connection);
    }

    let repo = SqlPersonRepository::new(SqliteDataAccess::new(connections))
        .with_connection(cli.connection);

    match cli.command {
        Command::Add(args) => {
            let person = args.into_person(0)?;
            write_result("add", repo.add(&person).await)
        }
        Command::Update { id, person } => {
            let person = person.into_person(id)?;
            write_result("update", repo.update(&person).await)
        }
        Command::Delete { id } => write_result("delete", repo.delete(id).await),
        Command::Get { id } => {
            let person = repo.get_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&person)?);
            Ok(())
        }
        Command::List => {
            let people = repo.get_all().await?;
            println!("{}", serde_json::to_string_pretty(&people)?);
            Ok(())
        }
        Command::Init | Command::Version => Ok(()),
    }
}

fn start_logging(cli: &Cli) -> Result<(), CliError> {
    match &cli.log_dir {
        Some(dir) => {
            let level = cli.log_level.as_deref().unwrap_or(default_log_level());
            init_logging(level, dir).map_err(CliError::Logging)
        }
        None => {
            let level = cli.log_level.as_deref().unwrap_or(STDERR_LOG_LEVEL);
            init_stderr_logging(level).map_err(CliError::Logging)
        }
    }
}

fn load_connections(cli: &Cli) -> Result<ConnectionStrings, CliError> {
    match (&cli.config, &cli.database) {
        (Some(path), _) => Ok(ConnectionStrings::from_json_file(path)?),
        (None, Some(database)) => {
            Ok(ConnectionStrings::new().with_connection(cli.connection.clone(), database.clone()))
        }
        (None, None) => Err(CliError::NoDatabase),
    }
}

fn init_database(connections: &ConnectionStrings, selector: &str) -> Result<(), CliError> {
    let connection_string = connections
        .get(selector)
        .ok_or_else(|| CliError::UnknownConnection(selector.to_string()))?;
    let mut conn = open_connection(connection_string)?;
    install_person_schema(&mut conn)?;
    info!("event=cli_init module=cli status=ok connection={selector}");
    println!("ok");
    Ok(())
}

fn write_result(operation: &'static str, succeeded: bool) -> Result<(), CliError> {
    if !succeeded {
        return Err(CliError::WriteFailed(operation));
    }
    println!("ok");
    Ok(())
}
