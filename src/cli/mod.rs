//! CLI layer for the overlay store.
//!
//! Provides the command-line interface using clap, with commands for
//! initializing the database, importing, listing, and editing overlays.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
