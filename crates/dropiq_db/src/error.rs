//! Error types for the database layer.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Database error types.
#[derive(Debug, Error, Diagnostic)]
pub enum DbError {
    /// SQLite/sqlx error
    #[error("Database error: {0}")]
    #[diagnostic(code(dropiq_db::sqlx))]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    #[diagnostic(code(dropiq_db::migration))]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    #[diagnostic(code(dropiq_db::not_found))]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Duplicate entity (unique constraint)
    #[error("{entity_type} already exists: {id}")]
    #[diagnostic(code(dropiq_db::already_exists))]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Invalid data
    #[error("Invalid data: {message}")]
    #[diagnostic(code(dropiq_db::invalid_data))]
    InvalidData { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    #[diagnostic(code(dropiq_db::serialization))]
    Serialization(#[from] serde_json::Error),

    /// IO error (creating the database directory)
    #[error("IO error: {0}")]
    #[diagnostic(code(dropiq_db::io))]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Create a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an already exists error.
    pub fn already_exists(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Convert a sqlx error, mapping unique-constraint violations to
    /// [`DbError::AlreadyExists`].
    pub fn from_insert(err: sqlx::Error, entity_type: &'static str, id: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::already_exists(entity_type, id)
            }
            _ => Self::Sqlx(err),
        }
    }

    /// True if this error is a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
