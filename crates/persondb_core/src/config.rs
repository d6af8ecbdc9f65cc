//! Named connection strings.
//!
//! # Responsibility
//! - Map connection selectors to SQLite connection strings.
//! - Parse the application-settings JSON layout used by host applications.
//!
//! # Invariants
//! - Names and values are never blank.
//! - `resolve(None)` always means [`DEFAULT_CONNECTION`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Selector used when a caller does not name a connection.
pub const DEFAULT_CONNECTION: &str = "conn";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Empty,
    InvalidEntry { name: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read connection settings: {err}"),
            Self::Parse(err) => write!(f, "invalid connection settings: {err}"),
            Self::Empty => write!(f, "connection settings define no connections"),
            Self::InvalidEntry { name } => {
                write!(f, "connection `{name}` must have a non-empty name and value")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Empty | Self::InvalidEntry { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Accepts both `{"ConnectionStrings": {...}}` and a flat `{...}` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum SettingsFile {
    Nested {
        #[serde(rename = "ConnectionStrings")]
        connection_strings: BTreeMap<String, String>,
    },
    Flat(BTreeMap<String, String>),
}

/// Selector -> connection string map.
///
/// Values are SQLite paths, `file:` URIs or `:memory:`. The gateway opens a
/// new connection per call, so `:memory:` only suits direct connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStrings {
    entries: BTreeMap<String, String>,
}

impl ConnectionStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single database reachable through the default selector.
    pub fn single(connection_string: impl Into<String>) -> Self {
        Self::new().with_connection(DEFAULT_CONNECTION, connection_string)
    }

    /// Adds or replaces a named connection string.
    pub fn with_connection(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let entries = match serde_json::from_str::<SettingsFile>(json)? {
            SettingsFile::Nested { connection_strings } => connection_strings,
            SettingsFile::Flat(entries) => entries,
        };

        if entries.is_empty() {
            return Err(ConfigError::Empty);
        }
        for (name, value) in &entries {
            if name.trim().is_empty() || value.trim().is_empty() {
                return Err(ConfigError::InvalidEntry { name: name.clone() });
            }
        }

        Ok(Self { entries })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Looks up `selector`, falling back to [`DEFAULT_CONNECTION`] on `None`.
    pub fn resolve(&self, selector: Option<&str>) -> Option<&str> {
        self.get(selector.unwrap_or(DEFAULT_CONNECTION))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConnectionStrings, DEFAULT_CONNECTION};

    #[test]
    fn parses_application_settings_layout() {
        let json = r#"{
            "Logging": { "LogLevel": { "Default": "Information" } },
            "ConnectionStrings": { "conn": "/var/lib/people.db", "audit": ":memory:" }
        }"#;
        let config = ConnectionStrings::from_json_str(json).unwrap();

        assert_eq!(config.resolve(None), Some("/var/lib/people.db"));
        assert_eq!(config.resolve(Some("audit")), Some(":memory:"));
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["audit", "conn"]);
    }

    #[test]
    fn parses_flat_layout() {
        let config = ConnectionStrings::from_json_str(r#"{"conn": "people.db"}"#).unwrap();
        assert_eq!(config.get(DEFAULT_CONNECTION), Some("people.db"));
    }

    #[test]
    fn rejects_empty_and_blank_entries() {
        assert!(matches!(
            ConnectionStrings::from_json_str("{}"),
            Err(ConfigError::Empty)
        ));
        assert!(matches!(
            ConnectionStrings::from_json_str(r#"{"ConnectionStrings": {"conn": " "}}"#),
            Err(ConfigError::InvalidEntry { name }) if name == "conn"
        ));
        assert!(matches!(
            ConnectionStrings::from_json_str("[1, 2]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_selector_resolves_to_none() {
        let config = ConnectionStrings::single(":memory:");
        assert_eq!(config.resolve(Some("reporting")), None);
        assert!(!config.is_empty());
    }
}
