//! Error types for the to-do store.

use rusqlite::ErrorCode;
use std::path::PathBuf;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the to-do store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write violated a primary key, unique, not-null or foreign key constraint.
    #[error("Integrity violation: {0}")]
    Integrity(#[source] rusqlite::Error),

    /// The backing file could not be opened or created.
    #[error("Storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The SQL text could not be compiled or bound.
    #[error("Malformed statement: {0}")]
    MalformedStatement(#[source] rusqlite::Error),

    /// Any other database error.
    #[error("Database error: {0}")]
    Db(#[source] rusqlite::Error),

    /// The connection has already been closed.
    #[error("Connection is closed")]
    Closed,

    /// Task not found.
    #[error("Task #{0} not found")]
    TaskNotFound(i64),

    /// Status value not allowed for the requested transition.
    #[error("Invalid status: {0}")]
    InvalidStatus(i64),
}

impl Error {
    /// True for constraint violations reported by the engine.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::Integrity(_))
    }

    /// Wrap an error raised while opening `path`.
    pub(crate) fn storage(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        Error::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _) => match e.code {
                ErrorCode::ConstraintViolation => Error::Integrity(err),
                // SQLITE_ERROR: syntax errors, unknown tables or columns
                ErrorCode::Unknown => Error::MalformedStatement(err),
                _ => Error::Db(err),
            },
            rusqlite::Error::SqlInputError { .. }
            | rusqlite::Error::MultipleStatement
            | rusqlite::Error::InvalidParameterCount(..)
            | rusqlite::Error::InvalidParameterName(_)
            | rusqlite::Error::InvalidColumnName(_) => Error::MalformedStatement(err),
            _ => Error::Db(err),
        }
    }
}
