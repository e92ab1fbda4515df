//! Error types shared across the crate

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification surfaced to callers at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidId,
    InvalidInput,
    StoreUnavailable,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidInput => "INVALID_INPUT",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidId(_) => ErrorKind::InvalidId,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Error::Database(e) => classify_database_error(e),
            Error::Migration(sqlx::migrate::MigrateError::Execute(e)) => {
                classify_database_error(e)
            }
            Error::Migration(_) | Error::Serialization(_) | Error::Internal(_) => {
                ErrorKind::Unknown
            }
        }
    }

    /// Errors caused by the caller rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::InvalidId | ErrorKind::InvalidInput
        )
    }
}

fn classify_database_error(error: &sqlx::Error) -> ErrorKind {
    match error {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => ErrorKind::StoreUnavailable,
        _ => ErrorKind::Unknown,
    }
}
