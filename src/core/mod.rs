//! Core domain models for the overlay store.
//!
//! Pure data structures with no I/O dependencies: the overlay record, its
//! enumerated background and transition values, and the typed partial
//! update.

pub mod overlay;

pub use overlay::{FieldValue, Fondo, OverlayField, OverlayItem, OverlayUpdate, Transicion};
