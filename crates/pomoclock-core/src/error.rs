//! Error types for pomoclock-core.
//!
//! Only storage-level failures are errors here. Malformed persisted records
//! and out-of-range preference input are healed in place (see
//! [`crate::storage`] and [`crate::Preferences::normalized`]) and never reach
//! this hierarchy.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage: {0}")]
    Database(#[from] DatabaseError),

    #[error("preferences: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A record could not be encoded for storage.
    #[error("encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the SQLite record store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Another process holds the write lock.
    #[error("record store is locked by another process")]
    Locked,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot use data directory {0}")]
    DataDir(String),

    #[error("cannot write {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path key that names no preference leaf.
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("bad value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejected user input that is not a preference.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("unknown mode '{0}' (expected work, short or long)")]
    UnknownMode(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
