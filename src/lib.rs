//! # Kraken DB - typed record store over an embedded SQLite file
//!
//! Kraken DB provides:
//! - A per-application database file under the user's config directory
//! - Record types declared through the [`Record`] trait, with tables created on open
//! - Create, read, read-by-field, update and delete, each in its own transaction
//! - Teardown that removes the database file and, when empty, its directory

pub mod value;
pub mod record;
pub mod storage;
pub mod paths;
pub mod store;
pub mod config;
pub mod ui;

#[cfg(test)]
pub(crate) mod fixtures;

use std::path::PathBuf;

// Re-exports for convenient access
pub use value::Value;
pub use record::{Column, ColumnType, Field, Record, TableSchema};
pub use storage::{Changes, Registry, Select, Session};
pub use store::{RecordStore, TableStat};
pub use config::StoreConfig;

/// Result type alias for Kraken DB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Kraken DB operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No {table} record where {predicate}")]
    NotFound {
        table: &'static str,
        predicate: String,
    },

    #[error("Unknown field `{field}` on {table}")]
    UnknownField {
        table: &'static str,
        field: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No config directory available for application `{0}`")]
    NoAppDir(String),

    #[error("Directory {} still holds other files; left in place", .0.display())]
    DirectoryNotEmpty(PathBuf),
}

impl Error {
    /// True for the "nothing matched" condition of single-result operations
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
