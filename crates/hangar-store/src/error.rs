//! Storage errors.

use std::path::PathBuf;

use hangar_core::ValidationError;
use thiserror::Error;

/// Errors from storage operations.
///
/// `Connection` only ever appears as a recorded fallback reason; every other
/// variant is returned to the caller unchanged.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("connection error: {message}")]
    Connection { message: String },

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("user already exists: {username}")]
    DuplicateUser { username: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt collection file {}: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("cannot decode {collection} row: {message}")]
    Decode {
        collection: &'static str,
        message: String,
    },
}

impl StorageError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn duplicate_user(username: impl Into<String>) -> Self {
        Self::DuplicateUser {
            username: username.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(collection: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            collection,
            message: message.into(),
        }
    }

    /// True for failures of the fallback file store (unreadable, corrupt, unwritable).
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Corrupt { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
