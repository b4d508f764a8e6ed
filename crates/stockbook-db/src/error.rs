//! # Store Errors
//!
//! ```text
//! sqlx::Error / MigrateError ──► DbError ──► AppError (stockbook-app)
//! ```
//!
//! Every failure is reported as-is; the store never retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by key found no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A save tried to write two rows with the same key, e.g. two products
    /// named alike in one snapshot.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// The file could not be opened or created, or the pool is gone.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement (CHECK constraint, syntax, locking).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value has no domain meaning: an unknown cash kind, an
    /// unparseable legacy date, a column of the wrong type.
    #[error("Corrupt {table} row: {reason}")]
    Corrupt { table: String, reason: String },

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn corrupt(table: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::Corrupt {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

/// SQLite reports unique failures as `UNIQUE constraint failed: table.column`.
fn unique_column(message: &str) -> Option<&str> {
    message
        .strip_prefix("UNIQUE constraint failed: ")
        .map(|columns| columns.split(',').next().unwrap_or(columns).trim())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),

            sqlx::Error::Database(db_err) => match unique_column(db_err.message()) {
                Some(column) => DbError::UniqueViolation {
                    field: column.to_string(),
                    value: "unknown".to_string(),
                },
                None => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::corrupt("unknown", format!("column {}: {}", index, source))
            }

            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed(err.to_string())
            }

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
