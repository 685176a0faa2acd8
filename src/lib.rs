//! # BookStore - inventory store
//!
//! SQLite-backed inventory of books addressed by content URIs.
//!
//! BookStore provides:
//! - A fixed contract (table, columns, URIs, MIME types)
//! - A lazily opened, versioned SQLite store behind a typed repository
//! - A provider that resolves content URIs to repository calls
//! - Change notification for observers of the collection or single items

pub mod contract;
pub mod uri;
pub mod item;
pub mod values;
pub mod storage;
pub mod notify;
pub mod cursor;
pub mod provider;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use uri::{ContentUri, Resource};
pub use item::{Item, ItemPatch, NewItem};
pub use values::{ContentValues, Value};
pub use storage::{ItemRepository, ListQuery, Selection, SortOrder, SqliteStore};
pub use notify::{ChangeEvent, ChangeNotifier, Subscription};
pub use cursor::Cursor;
pub use provider::ItemProvider;

/// Result type alias for BookStore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for BookStore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown URI: {0}")]
    UnknownUri(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to insert row for {0}")]
    InsertFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    #[error("No migration registered for schema version {0}")]
    MissingMigration(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
