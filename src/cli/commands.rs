//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{
    OutputFormat, format_import_result, format_overlay, format_overlay_list, format_status,
    format_update_result,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::OverlayUpdate;
use crate::error::{CommandError, Result, StorageError};
use crate::io::{export_overlays, read_overlays, write_file};
use crate::storage::{SqliteStorage, Storage};
use std::path::Path;
use tracing::info;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::List => cmd_list(&db_path, format),
        Commands::Show { id } => cmd_show(&db_path, *id, format),
        Commands::Import { file } => cmd_import(&db_path, file, format),
        Commands::Export { output } => cmd_export(&db_path, output.as_deref(), format),
        Commands::Update { id, fields } => cmd_update(&db_path, *id, fields, format),
    }
}

/// Creates a store for the database path. The engine opens on first use.
fn open_storage(db_path: &Path) -> SqliteStorage {
    SqliteStorage::open(db_path)
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    // Check if already exists
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    // If force, delete existing database and its WAL side files
    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
        for suffix in ["-wal", "-shm"] {
            let mut side = db_path.as_os_str().to_owned();
            side.push(suffix);
            if let Err(e) = std::fs::remove_file(&side)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                return Err(CommandError::ExecutionFailed(format!(
                    "Failed to remove {}: {e}",
                    Path::new(&side).display()
                ))
                .into());
            }
        }
    }

    let storage = open_storage(db_path);
    storage.init()?;
    info!(path = %db_path.display(), "initialized overlay database");

    match format {
        OutputFormat::Text => Ok(format!(
            "Initialized overlay database at: {}\n",
            db_path.display()
        )),
        OutputFormat::Json => Ok(serde_json::json!({
            "initialized": true,
            "path": db_path.to_string_lossy(),
        })
        .to_string()),
    }
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path);
    let stats = storage.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_list(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path);
    let overlays = storage.list_overlays()?;
    Ok(format_overlay_list(&overlays, format))
}

fn cmd_show(db_path: &Path, id: i64, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path);
    let overlay = storage
        .get_overlay(id)?
        .ok_or(StorageError::OverlayNotFound { id })?;
    Ok(format_overlay(&overlay, format))
}

fn cmd_import(db_path: &Path, file: &Path, format: OutputFormat) -> Result<String> {
    // Parse everything before touching the table
    let overlays = read_overlays(file)?;

    let storage = open_storage(db_path);
    let count = storage.replace_overlays(&overlays)?;
    info!(count, source = %file.display(), "imported overlays");

    Ok(format_import_result(
        count,
        &file.to_string_lossy(),
        format,
    ))
}

fn cmd_export(db_path: &Path, output: Option<&Path>, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path);
    let overlays = storage.list_overlays()?;
    let json = export_overlays(&overlays)?;

    match output {
        Some(path) => {
            write_file(path, &json)?;
            match format {
                OutputFormat::Text => Ok(format!(
                    "Exported {} overlays to {}\n",
                    overlays.len(),
                    path.display()
                )),
                OutputFormat::Json => Ok(serde_json::json!({
                    "exported": overlays.len(),
                    "path": path.to_string_lossy(),
                })
                .to_string()),
            }
        }
        None => Ok(format!("{json}\n")),
    }
}

fn cmd_update(db_path: &Path, id: i64, fields: &[String], format: OutputFormat) -> Result<String> {
    let update = OverlayUpdate::from_pairs(fields)?;

    let storage = open_storage(db_path);
    let changed = storage.update_overlay(id, &update)?;
    Ok(format_update_result(id, changed, format))
}
