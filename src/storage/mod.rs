//! Storage layer for the overlay store.
//!
//! Provides persistent storage for overlays using `SQLite`. The engine is
//! opened lazily and the schema applied once per store.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageStats};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".overlays/overlays.db";
