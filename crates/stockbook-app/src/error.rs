//! # Application Error Type
//!
//! Everything a [`Shop`](crate::Shop) call can fail with.
//!
//! ```text
//! CoreError (rule violation)  ──┐
//! DbError   (store failure)   ──┼──► AppError ──► caller
//! config / io failures        ──┘
//! ```
//!
//! Nothing is retried or masked on the way up.

use thiserror::Error;

use stockbook_core::{CoreError, ErrorKind};
use stockbook_db::DbError;

#[derive(Debug, Error)]
pub enum AppError {
    /// A catalog, cart or ledger rule was violated. State is unchanged.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed.
    #[error("Storage error: {0}")]
    Db(#[from] DbError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    ConfigSaveFailed(String),

    /// No platform data/config directory could be determined.
    #[error("Could not determine application directory")]
    NoAppDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Kind of the underlying rule violation, if this is one.
    pub fn core_kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Core(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::ConfigSaveFailed(err.to_string())
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
