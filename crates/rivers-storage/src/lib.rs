//! SQLite persistence for the river graph.
//!
//! The pipeline treats this layer as an opaque, fully-synchronous bulk
//! store: replace/append edge and node sets keyed by primary id, plus the
//! indexed `downstream_id` lookup the labeler and binarizer depend on.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;

use rivers_core::errors::StorageError;

/// Map a rusqlite failure into the storage error type.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
