//! Error taxonomy shared by every layer of the crate.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or blank mandatory key, unreadable config file, unknown driver
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any storage failure, including zero rows affected on save/update
    #[error("Repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error in {path}: {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn repository(message: impl Into<String>) -> Self {
        AppError::Repository {
            message: message.into(),
            source: None,
        }
    }

    pub fn connection(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::Connection {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Wraps an I/O failure with the file it concerns.
    pub fn io(message: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        AppError::Io {
            message: format!("{}: {}", message.into(), path.display()),
            source,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Repository {
            message: "Database operation failed".to_string(),
            source: Some(err),
        }
    }
}
