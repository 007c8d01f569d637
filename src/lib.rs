//! # overlay-store
//!
//! Embedded `SQLite` persistence for timed image overlays.
//!
//! A single `overlays` table holds every overlay for a piece of content.
//! The store opens its engine lazily, applies the schema exactly once, and
//! exposes three data operations: list everything by start time, replace
//! everything from an import, and update selected fields of one overlay.
//!
//! ## Features
//!
//! - **Lazy, single-flight initialization**: concurrent first callers share one engine
//! - **Atomic bulk replace**: a failed import leaves the previous overlays intact
//! - **Typed partial updates**: only known columns can be set
//! - **JSON import/export** and a small CLI

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod storage;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Fondo, OverlayField, OverlayItem, OverlayUpdate, Transicion};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, SqliteStorage, Storage, StorageStats};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
