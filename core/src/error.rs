use crate::types::Points;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("invalid state: {message}")]
    InvalidState { message: String },

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Points, available: Points },

    /// Transient lock contention. The caller may retry; the core never does.
    #[error("store busy, retry later")]
    Busy,

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl ExchangeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

/// Map SQLite failures onto the domain taxonomy:
/// unique-constraint violations become `Conflict` (the race-safe duplicate
/// check lives in the schema, not in application reads), and lock
/// contention becomes the retryable `Busy`.
impl From<rusqlite::Error> for ExchangeError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, _) = &err {
            let unique_violation = code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
            if unique_violation {
                return ExchangeError::Conflict {
                    message: err.to_string(),
                };
            }
            if matches!(
                code.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) {
                return ExchangeError::Busy;
            }
        }
        ExchangeError::Database(err)
    }
}
