//! Error type for absint-results-db.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Database errors (SQLite)
    Database,
    /// Serialization/deserialization errors
    Serialization,
    /// No result stored for the requested key
    ResultNotFound,
    /// Transaction errors
    Transaction,
    /// Configuration errors
    Config,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "database",
            ErrorKind::Serialization => "serialization",
            ErrorKind::ResultNotFound => "result_not_found",
            ErrorKind::Transaction => "transaction",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct StorageError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn result_not_found(check_kind: impl Into<String>, call_context: u32, statement_id: u32) -> Self {
        Self::new(
            ErrorKind::ResultNotFound,
            format!(
                "no result for check '{}' (call context {}, statement {})",
                check_kind.into(),
                call_context,
                statement_id
            ),
        )
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transaction, message)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::database(format!("SQLite error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_matches_the_bracketed_kind_format() {
        let err = StorageError::database("connection failed");
        assert_eq!(format!("{}", err), "[database] connection failed");
    }

    #[test]
    fn result_not_found_names_the_missing_key() {
        let err = StorageError::result_not_found("null_deref", 3, 7);
        assert_eq!(err.kind, ErrorKind::ResultNotFound);
        assert!(err.message.contains("null_deref"));
        assert!(err.message.contains('3'));
        assert!(err.message.contains('7'));
    }

    #[test]
    fn with_source_chains_the_underlying_error() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing file");
        let err = StorageError::database("db file missing").with_source(io_err);
        assert!(err.source.is_some());
        assert!(err.source().unwrap().to_string().contains("missing file"));
    }

    #[test]
    fn error_kind_as_str_matches_every_variant() {
        assert_eq!(ErrorKind::Database.as_str(), "database");
        assert_eq!(ErrorKind::Serialization.as_str(), "serialization");
        assert_eq!(ErrorKind::ResultNotFound.as_str(), "result_not_found");
        assert_eq!(ErrorKind::Transaction.as_str(), "transaction");
        assert_eq!(ErrorKind::Config.as_str(), "config");
        assert_eq!(ErrorKind::IO.as_str(), "io");
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn rusqlite_errors_convert_into_database_errors() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let err: StorageError = sqlite_err.into();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(err.source.is_some());
    }

    #[test]
    fn serde_json_errors_convert_into_serialization_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: StorageError = json_err.into();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }
}
