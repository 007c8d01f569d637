//! I/O utilities for the overlay store.
//!
//! Provides plain file reading and writing plus the JSON import/export
//! format that feeds bulk replacement.

pub mod import;
pub mod reader;

pub use import::{export_overlays, parse_overlays, read_overlays};
pub use reader::{read_file, write_file};
