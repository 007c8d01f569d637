//! Storage trait definition.
//!
//! Defines the interface for overlay storage backends.

use crate::core::{OverlayItem, OverlayUpdate};
use crate::error::Result;
use serde::Serialize;

/// Trait for persistent overlay storage.
///
/// Methods take `&self`: implementations own their connection behind
/// interior locking so a single store can be shared across threads.
pub trait Storage: Send + Sync {
    /// Initializes storage (opens the engine, creates the schema).
    ///
    /// Idempotent. Concurrent first callers share one initialization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError::Initialization`] if the engine
    /// cannot be opened or the schema is rejected.
    fn init(&self) -> Result<()>;

    /// Checks whether this store has opened its engine and the overlays
    /// table exists in it.
    ///
    /// Does not open the engine: a store that has not yet connected reports
    /// `false` even when its database file already holds the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Lists every overlay ordered ascending by start time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError::Query`] if the read fails.
    fn list_overlays(&self) -> Result<Vec<OverlayItem>>;

    /// Retrieves an overlay by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_overlay(&self, id: i64) -> Result<Option<OverlayItem>>;

    /// Replaces the whole table with `overlays`, inserted in the order given.
    ///
    /// Any ids on the input are ignored; fresh ids are assigned. Returns the
    /// number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError::Write`] if any row is rejected.
    fn replace_overlays(&self, overlays: &[OverlayItem]) -> Result<usize>;

    /// Sets the fields present in `update` on the overlay with `id`.
    ///
    /// A missing id is not an error: zero rows are affected. Returns the
    /// number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError::EmptyUpdate`] if `update` sets
    /// nothing, or [`crate::error::StorageError::Write`] if the engine
    /// rejects the statement.
    fn update_overlay(&self, id: i64, update: &OverlayUpdate) -> Result<usize>;

    /// Returns the count of overlays.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    fn overlay_count(&self) -> Result<usize>;

    /// Gets storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StorageStats>;
}

/// Storage statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageStats {
    /// Number of overlays stored.
    pub overlay_count: usize,
    /// Sum of all overlay durations in seconds.
    pub total_duration: f64,
    /// Latest `tiempo_inicio + duracion`, if any overlay exists.
    pub timeline_end: Option<f64>,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
