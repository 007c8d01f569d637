//! Error types for overlay store operations.
//!
//! This module provides the error hierarchy using `thiserror` for storage,
//! validation, file I/O, and CLI commands.

use thiserror::Error;

/// Result type alias for overlay store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Field or value validation errors.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Storage-specific errors for database operations.
///
/// `Initialization`, `Query` and `Write` carry the engine's message and are
/// never retried internally.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The engine could not be opened or the schema statement was rejected.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// A read statement failed.
    #[error("query failed: {0}")]
    Query(String),

    /// An insert, update or delete was rejected (constraint or engine error).
    #[error("write failed: {0}")]
    Write(String),

    /// Transaction could not be started, committed or rolled back.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A partial update carried no fields.
    #[error("update for overlay {id} has no fields to set")]
    EmptyUpdate {
        /// Target overlay ID.
        id: i64,
    },

    /// Overlay not found by ID.
    #[error("overlay not found: {id}")]
    OverlayNotFound {
        /// Overlay ID that was not found.
        id: i64,
    },

    /// The connection lock was poisoned by a panicking holder.
    #[error("connection lock poisoned")]
    LockPoisoned,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Wraps an engine error raised while opening or creating the schema.
    pub fn initialization(err: impl std::fmt::Display) -> Self {
        Self::Initialization(err.to_string())
    }

    /// Wraps an engine error raised by a read statement.
    pub fn query(err: impl std::fmt::Display) -> Self {
        Self::Query(err.to_string())
    }

    /// Wraps an engine error raised by a mutating statement.
    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::Write(err.to_string())
    }

    /// Wraps an engine error raised by transaction control.
    pub fn transaction(err: impl std::fmt::Display) -> Self {
        Self::Transaction(err.to_string())
    }
}

/// Validation errors for overlay fields and values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field name is not an updatable overlay column.
    #[error("unknown field: {name}")]
    UnknownField {
        /// The rejected field name.
        name: String,
    },

    /// Value could not be parsed for the given field.
    #[error("invalid value for {field}: {value:?} (expected {expected})")]
    InvalidValue {
        /// Field being assigned.
        field: String,
        /// Raw value supplied.
        value: String,
        /// Description of what is accepted.
        expected: String,
    },

    /// Assignment was not written as `field=value`.
    #[error("malformed assignment {0:?}, expected field=value")]
    MalformedAssignment(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Import file did not contain a valid overlay list.
    #[error("invalid import file: {path}: {reason}")]
    InvalidImport {
        /// Path to the import file.
        path: String,
        /// Parser message.
        reason: String,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
