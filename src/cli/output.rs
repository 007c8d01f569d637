//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::OverlayItem;
use crate::storage::StorageStats;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StorageStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats),
        OutputFormat::Json => format_json(stats),
    }
}

fn format_status_text(stats: &StorageStats) -> String {
    let mut output = String::new();
    output.push_str("Overlay Store Status\n");
    output.push_str("====================\n\n");
    let _ = writeln!(output, "  Overlays:       {}", stats.overlay_count);
    let _ = writeln!(output, "  Total duration: {:.2}s", stats.total_duration);
    if let Some(end) = stats.timeline_end {
        let _ = writeln!(output, "  Timeline end:   {end:.2}s");
    }
    let _ = writeln!(output, "  Schema:         v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:        {size} bytes");
    }
    output
}

/// Formats an overlay list.
#[must_use]
pub fn format_overlay_list(overlays: &[OverlayItem], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_overlay_list_text(overlays),
        OutputFormat::Json => format_json(&overlays),
    }
}

fn format_overlay_list_text(overlays: &[OverlayItem]) -> String {
    if overlays.is_empty() {
        return "No overlays found.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<6} {:<9} {:<9} {:<12} {:<6} {:<13} {:<11} Image",
        "ID", "Start", "Duration", "Position", "Width", "Background", "Transition"
    );
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for overlay in overlays {
        let id = overlay
            .id
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        let position = format!("{},{}", overlay.posicion_x, overlay.posicion_y);

        let _ = writeln!(
            output,
            "{:<6} {:<9.2} {:<9.2} {:<12} {:<6} {:<13} {:<11} {}",
            id,
            overlay.tiempo_inicio,
            overlay.duracion,
            position,
            overlay.ancho,
            overlay.fondo,
            overlay.transicion,
            truncate(&overlay.url_imagen, 30)
        );
    }

    output
}

/// Formats a single overlay.
#[must_use]
pub fn format_overlay(overlay: &OverlayItem, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Overlay: {}", overlay.url_imagen);
            let _ = writeln!(output, "  ID:         {}", overlay.id.unwrap_or(0));
            let _ = writeln!(
                output,
                "  Position:   {},{}",
                overlay.posicion_x, overlay.posicion_y
            );
            let _ = writeln!(output, "  Width:      {}", overlay.ancho);
            let _ = writeln!(
                output,
                "  Time:       {:.2}s - {:.2}s",
                overlay.tiempo_inicio,
                overlay.end_time()
            );
            let _ = writeln!(output, "  Background: {}", overlay.fondo);
            let _ = writeln!(output, "  Transition: {}", overlay.transicion);
            output
        }
        OutputFormat::Json => format_json(overlay),
    }
}

/// Formats the result of a bulk import.
#[must_use]
pub fn format_import_result(count: usize, source: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Imported {count} overlays from {source}\n"),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ImportOutput<'a> {
                imported: usize,
                source: &'a str,
            }
            format_json(&ImportOutput {
                imported: count,
                source,
            })
        }
    }
}

/// Formats the result of a partial update.
#[must_use]
pub fn format_update_result(id: i64, changed: usize, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if changed == 0 {
                format!("No overlay with ID {id}; nothing changed.\n")
            } else {
                format!("Updated overlay {id}.\n")
            }
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct UpdateOutput {
                id: i64,
                changed: usize,
            }
            format_json(&UpdateOutput { id, changed })
        }
    }
}

/// Formats an error for the given output format.
#[must_use]
pub fn format_error(error: &crate::error::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json(&ErrorOutput {
                error: error.to_string(),
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates a string to max chars with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fondo, Transicion};
    use crate::error::{Error, StorageError};

    fn sample() -> OverlayItem {
        let mut item = OverlayItem::new(
            "b.png",
            10,
            20,
            200,
            1.0,
            3.0,
            Fondo::Opacidad,
            Transicion::Difuminado,
        );
        item.id = Some(4);
        item
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("imágenes", 5), "im...");
    }

    #[test]
    fn test_format_status() {
        let stats = StorageStats {
            overlay_count: 2,
            total_duration: 5.0,
            timeline_end: Some(7.0),
            schema_version: 1,
            db_size: Some(4096),
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Overlays:       2"));
        assert!(text.contains("Timeline end:   7.00s"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"overlay_count\": 2"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(
            format_overlay_list(&[], OutputFormat::Text),
            "No overlays found.\n"
        );
        assert_eq!(format_overlay_list(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn test_format_list_text() {
        let text = format_overlay_list(&[sample()], OutputFormat::Text);
        assert!(text.contains("b.png"));
        assert!(text.contains("opacidad"));
        assert!(text.contains("10,20"));
    }

    #[test]
    fn test_format_overlay() {
        let text = format_overlay(&sample(), OutputFormat::Text);
        assert!(text.contains("1.00s - 4.00s"));

        let json = format_overlay(&sample(), OutputFormat::Json);
        assert!(json.contains("\"id\": 4"));
        assert!(json.contains("\"transicion\": \"difuminado\""));
    }

    #[test]
    fn test_format_update_result() {
        assert!(format_update_result(9, 0, OutputFormat::Text).contains("nothing changed"));
        assert!(format_update_result(9, 1, OutputFormat::Json).contains("\"changed\": 1"));
    }

    #[test]
    fn test_format_error_json() {
        let err = Error::Storage(StorageError::OverlayNotFound { id: 2 });
        let json = format_error(&err, OutputFormat::Json);
        assert!(json.contains("overlay not found: 2"));
    }
}
