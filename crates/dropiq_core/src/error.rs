//! Error types for the domain layer.

use dropiq_auth::AuthError;
use dropiq_db::DbError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for domain operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Configuration-specific errors
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] AuthError),

    #[error("{field}: {message}")]
    #[diagnostic(
        code(dropiq_core::validation),
        help("Fix the '{field}' field and retry")
    )]
    Validation { field: String, message: String },

    #[error("{0}")]
    #[diagnostic(code(dropiq_core::unauthorized))]
    Unauthorized(String),

    #[error("{0}")]
    #[diagnostic(code(dropiq_core::forbidden))]
    Forbidden(String),

    #[error("{entity} not found: {id}")]
    #[diagnostic(code(dropiq_core::not_found))]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    #[diagnostic(code(dropiq_core::conflict))]
    Conflict(String),

    #[error("{provider} request failed: {message}")]
    #[diagnostic(
        code(dropiq_core::provider),
        help("Check the '{provider}' endpoint and credentials in the configuration")
    )]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("HTTP error: {0}")]
    #[diagnostic(code(dropiq_core::http))]
    Http(#[from] reqwest::Error),

    #[error("Configuration error in {config_path}: {cause}")]
    #[diagnostic(
        code(dropiq_core::configuration),
        help("Expected {expected} for field '{field}'")
    )]
    Configuration {
        config_path: String,
        field: String,
        expected: String,
        cause: ConfigError,
    },
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}
