//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// overlay-store: manage timed image overlays in an embedded database.
#[derive(Parser, Debug)]
#[command(name = "overlay-store")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the overlay database file.
    ///
    /// Defaults to `.overlays/overlays.db` in the current directory.
    #[arg(short, long, env = "OVERLAY_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the overlay database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show database statistics.
    Status,

    /// List all overlays ordered by start time.
    #[command(name = "list", alias = "ls")]
    List,

    /// Show a single overlay.
    Show {
        /// Overlay ID.
        id: i64,
    },

    /// Replace all overlays with the contents of a JSON file.
    Import {
        /// Path to a JSON array of overlays.
        file: PathBuf,
    },

    /// Export all overlays as JSON.
    Export {
        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Update fields of one overlay.
    Update {
        /// Overlay ID.
        id: i64,

        /// Assignments such as `ancho=500` or `fondo=opacidad`.
        #[arg(required = true, value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
