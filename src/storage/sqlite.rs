//! `SQLite` storage implementation.
//!
//! The engine connection is created on first use and cached behind a mutex.
//! The mutex is held across the "is there a connection?" check and the
//! creation step, so concurrent first callers share a single engine
//! instance and a single schema application.

// SQLite stores all integers as i64. Counts are never negative.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::{FieldValue, OverlayItem, OverlayUpdate};
use crate::error::{Result, StorageError, ValidationError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, INSERT_OVERLAY_SQL, SCHEMA_SQL,
    SELECT_COLUMNS, SET_VERSION_SQL,
};
use crate::storage::traits::{Storage, StorageStats};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Where the engine keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite-based overlay storage.
///
/// Construct one per application and share it by reference (or `Arc`).
/// Nothing touches the disk until [`Storage::init`] or the first operation.
///
/// # Examples
///
/// ```
/// use overlay_store::storage::{SqliteStorage, Storage};
///
/// let storage = SqliteStorage::in_memory();
/// storage.init().unwrap();
/// assert_eq!(storage.overlay_count().unwrap(), 0);
/// ```
#[derive(Debug)]
pub struct SqliteStorage {
    location: Location,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStorage {
    /// Creates a store backed by the database file at `path`.
    ///
    /// The file and its parent directories are created lazily.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_location(Location::File(path.as_ref().to_path_buf()))
    }

    /// Creates a store backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self::with_location(Location::Memory)
    }

    const fn with_location(location: Location) -> Self {
        Self {
            location,
            conn: Mutex::new(None),
        }
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    /// Runs `f` against the connection, creating it first if needed.
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let conn = guard
            .as_mut()
            .ok_or_else(|| StorageError::initialization("connection unavailable"))?;
        f(conn)
    }

    /// Opens the engine and applies the schema.
    fn connect(&self) -> Result<Connection> {
        let conn = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.exists()
                {
                    std::fs::create_dir_all(parent).map_err(StorageError::initialization)?;
                }

                let conn = Connection::open(path).map_err(StorageError::initialization)?;

                // journal_mode returns the resulting mode as a row
                let _: String = conn
                    .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
                    .map_err(StorageError::initialization)?;
                conn
            }
            Location::Memory => Connection::open_in_memory().map_err(StorageError::initialization)?,
        };

        conn.execute_batch(SCHEMA_SQL)
            .map_err(StorageError::initialization)?;
        conn.execute(
            SET_VERSION_SQL,
            params![CURRENT_SCHEMA_VERSION.to_string()],
        )
        .map_err(StorageError::initialization)?;

        info!(location = ?self.location, "opened overlay database");
        Ok(conn)
    }

    /// Gets the stored schema version.
    fn schema_version(conn: &Connection) -> Result<Option<u32>> {
        let version: Option<String> = conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::query)?;

        version
            .map(|v| {
                v.parse::<u32>()
                    .map_err(|e| StorageError::query(format!("bad schema version {v:?}: {e}")))
            })
            .transpose()
            .map_err(Into::into)
    }
}

/// Decodes one `overlays` row by column name.
fn row_to_overlay(row: &Row<'_>) -> rusqlite::Result<OverlayItem> {
    Ok(OverlayItem {
        id: Some(row.get("id")?),
        url_imagen: row.get("url_imagen")?,
        posicion_x: row.get("posicion_x")?,
        posicion_y: row.get("posicion_y")?,
        ancho: row.get("ancho")?,
        tiempo_inicio: row.get("tiempo_inicio")?,
        duracion: row.get("duracion")?,
        fondo: parse_column(row, "fondo")?,
        transicion: parse_column(row, "transicion")?,
    })
}

/// Reads a TEXT column and parses it into an enumerated value.
fn parse_column<T>(row: &Row<'_>, name: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = ValidationError>,
{
    let idx = row.as_ref().column_index(name)?;
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn to_sql_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => Value::Integer(v),
        FieldValue::Real(v) => Value::Real(v),
        FieldValue::Text(v) => Value::Text(v),
    }
}

impl Storage for SqliteStorage {
    fn init(&self) -> Result<()> {
        self.with_conn(|_| Ok(()))
    }

    fn is_initialized(&self) -> Result<bool> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(false);
        };
        let count: i64 = conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::query)?;
        Ok(count > 0)
    }

    fn list_overlays(&self) -> Result<Vec<OverlayItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM overlays ORDER BY tiempo_inicio ASC, id ASC"
                ))
                .map_err(StorageError::query)?;

            let overlays = stmt
                .query_map([], row_to_overlay)
                .map_err(StorageError::query)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(StorageError::query)?;

            Ok(overlays)
        })
    }

    fn get_overlay(&self, id: i64) -> Result<Option<OverlayItem>> {
        self.with_conn(|conn| {
            let overlay = conn
                .query_row(
                    &format!("SELECT {SELECT_COLUMNS} FROM overlays WHERE id = ?"),
                    params![id],
                    row_to_overlay,
                )
                .optional()
                .map_err(StorageError::query)?;
            Ok(overlay)
        })
    }

    fn replace_overlays(&self, overlays: &[OverlayItem]) -> Result<usize> {
        self.with_conn(|conn| {
            // Dropping the transaction on an early return rolls it back
            let tx = conn.transaction().map_err(StorageError::transaction)?;

            let removed = tx
                .execute("DELETE FROM overlays", [])
                .map_err(StorageError::write)?;

            {
                let mut stmt = tx
                    .prepare(INSERT_OVERLAY_SQL)
                    .map_err(StorageError::write)?;

                for item in overlays {
                    item.validate()?;
                    stmt.execute(params![
                        item.url_imagen,
                        item.posicion_x,
                        item.posicion_y,
                        item.ancho,
                        item.tiempo_inicio,
                        item.duracion,
                        item.fondo.as_str(),
                        item.transicion.as_str(),
                    ])
                    .map_err(StorageError::write)?;
                }
            }

            tx.commit().map_err(StorageError::transaction)?;

            debug!(removed, inserted = overlays.len(), "replaced overlays");
            Ok(overlays.len())
        })
    }

    fn update_overlay(&self, id: i64, update: &OverlayUpdate) -> Result<usize> {
        let assignments = update.assignments();
        if assignments.is_empty() {
            return Err(StorageError::EmptyUpdate { id }.into());
        }
        update.validate()?;

        // Column names come from OverlayField, never from caller strings
        let set_clause = assignments
            .iter()
            .map(|(field, _)| format!("{} = ?", field.column()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE overlays SET {set_clause} WHERE id = ?");

        let mut values: Vec<Value> = assignments
            .into_iter()
            .map(|(_, value)| to_sql_value(value))
            .collect();
        values.push(Value::Integer(id));

        self.with_conn(|conn| {
            let changed = conn
                .execute(&sql, params_from_iter(values))
                .map_err(StorageError::write)?;
            debug!(id, changed, "updated overlay");
            Ok(changed)
        })
    }

    fn overlay_count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM overlays", [], |row| row.get(0))
                .map_err(StorageError::query)?;
            Ok(count as usize)
        })
    }

    fn stats(&self) -> Result<StorageStats> {
        let (overlay_count, total_duration, timeline_end, schema_version) =
            self.with_conn(|conn| {
                let (count, total, end): (i64, f64, Option<f64>) = conn
                    .query_row(
                        r"
                SELECT COUNT(*), COALESCE(SUM(duracion), 0.0), MAX(tiempo_inicio + duracion)
                FROM overlays
            ",
                        [],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .map_err(StorageError::query)?;
                let version = Self::schema_version(conn)?.unwrap_or(0);
                Ok((count as usize, total, end, version))
            })?;

        let db_size = self
            .path()
            .and_then(|p| std::fs::metadata(p).ok().map(|m| m.len()));

        Ok(StorageStats {
            overlay_count,
            total_duration,
            timeline_end,
            schema_version,
            db_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fondo, Transicion};
    use crate::error::Error;
    use std::sync::Arc;

    fn setup() -> SqliteStorage {
        let storage = SqliteStorage::in_memory();
        storage.init().unwrap();
        storage
    }

    fn overlay(url: &str, inicio: f64) -> OverlayItem {
        OverlayItem::new(
            url,
            0,
            0,
            100,
            inicio,
            2.0,
            Fondo::Transparente,
            Transicion::Lateral,
        )
    }

    fn raw_execute(storage: &SqliteStorage, sql: &str) -> Result<usize> {
        storage.with_conn(|conn| Ok(conn.execute(sql, []).map_err(StorageError::write)?))
    }

    #[test]
    fn test_init() {
        let storage = SqliteStorage::in_memory();
        assert!(!storage.is_initialized().unwrap());
        assert!(storage.init().is_ok());
        assert!(storage.is_initialized().unwrap());
    }

    #[test]
    fn test_init_idempotent() {
        let storage = SqliteStorage::in_memory();
        assert!(storage.init().is_ok());
        assert!(storage.init().is_ok()); // Second init should be fine

        let tables: i64 = storage
            .with_conn(|conn| {
                Ok(conn
                    .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
                    .map_err(StorageError::query)?)
            })
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_first_operation_initializes() {
        let storage = SqliteStorage::in_memory();
        assert!(storage.list_overlays().unwrap().is_empty());
        assert!(storage.is_initialized().unwrap());
    }

    #[test]
    fn test_concurrent_first_init_shares_engine() {
        let storage = Arc::new(SqliteStorage::in_memory());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let storage = Arc::clone(&storage);
                scope.spawn(move || storage.init().unwrap());
            }
        });

        // A second in-memory engine would not see rows written through the first
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let storage = Arc::clone(&storage);
                scope.spawn(move || assert_eq!(storage.overlay_count().unwrap(), 1));
            }
        });
    }

    #[test]
    fn test_replace_and_list_ordered() {
        let storage = setup();
        let inserted = storage
            .replace_overlays(&[overlay("late.png", 9.0), overlay("early.png", 0.5)])
            .unwrap();
        assert_eq!(inserted, 2);

        let listed = storage.list_overlays().unwrap();
        let urls: Vec<_> = listed.iter().map(|o| o.url_imagen.as_str()).collect();
        assert_eq!(urls, vec!["early.png", "late.png"]);
        assert!(listed.iter().all(|o| o.id.is_some()));
    }

    #[test]
    fn test_replace_ignores_caller_ids() {
        let storage = setup();
        let mut item = overlay("a.png", 1.0);
        item.id = Some(999);
        storage.replace_overlays(&[item]).unwrap();

        let listed = storage.list_overlays().unwrap();
        assert_ne!(listed[0].id, Some(999));
    }

    #[test]
    fn test_replace_assigns_fresh_ids() {
        let storage = setup();
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        let first = storage.list_overlays().unwrap()[0].id;

        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        let second = storage.list_overlays().unwrap()[0].id;

        // AUTOINCREMENT never reuses ids
        assert!(second > first);
    }

    #[test]
    fn test_replace_with_empty_clears() {
        let storage = setup();
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        assert_eq!(storage.replace_overlays(&[]).unwrap(), 0);
        assert!(storage.list_overlays().unwrap().is_empty());
    }

    #[test]
    fn test_replace_failure_rolls_back() {
        let storage = setup();
        storage.replace_overlays(&[overlay("keep.png", 1.0)]).unwrap();
        raw_execute(
            &storage,
            "CREATE TRIGGER reject_bad BEFORE INSERT ON overlays
             WHEN NEW.url_imagen = 'bad.png'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .unwrap();

        let err = storage
            .replace_overlays(&[overlay("new.png", 2.0), overlay("bad.png", 3.0)])
            .unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Write(_))));

        let listed = storage.list_overlays().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].url_imagen, "keep.png");
    }

    #[test]
    fn test_replace_rejects_non_finite_times() {
        let storage = setup();
        storage.replace_overlays(&[overlay("keep.png", 1.0)]).unwrap();

        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = storage
                .replace_overlays(&[overlay("new.png", 2.0), overlay("bad.png", bad)])
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        let listed = storage.list_overlays().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].url_imagen, "keep.png");
    }

    #[test]
    fn test_update_rejects_non_finite_times() {
        let storage = setup();
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        let before = storage.list_overlays().unwrap().remove(0);
        let id = before.id.unwrap();

        let update = OverlayUpdate {
            ancho: Some(7),
            tiempo_inicio: Some(f64::INFINITY),
            ..Default::default()
        };
        let err = storage.update_overlay(id, &update).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(storage.get_overlay(id).unwrap().unwrap(), before);
    }

    #[test]
    fn test_check_constraint_rejects_bad_enum() {
        let storage = setup();
        let err = raw_execute(
            &storage,
            "INSERT INTO overlays (url_imagen, posicion_x, posicion_y, ancho, tiempo_inicio,
             duracion, fondo, transicion) VALUES ('x.png', 0, 0, 1, 0.0, 1.0, 'negro', 'lateral')",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Write(_))));
        assert_eq!(storage.overlay_count().unwrap(), 0);
    }

    #[test]
    fn test_list_fails_loudly_on_bad_enum_text() {
        let storage = setup();
        raw_execute(&storage, "PRAGMA ignore_check_constraints = ON").unwrap();
        raw_execute(
            &storage,
            "INSERT INTO overlays (url_imagen, posicion_x, posicion_y, ancho, tiempo_inicio,
             duracion, fondo, transicion) VALUES ('x.png', 0, 0, 1, 0.0, 1.0, 'negro', 'lateral')",
        )
        .unwrap();

        let err = storage.list_overlays().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Query(_))));
    }

    #[test]
    fn test_update_single_field() {
        let storage = setup();
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        let before = storage.list_overlays().unwrap().remove(0);
        let id = before.id.unwrap();

        let update = OverlayUpdate {
            ancho: Some(500),
            ..Default::default()
        };
        assert_eq!(storage.update_overlay(id, &update).unwrap(), 1);

        let after = storage.get_overlay(id).unwrap().unwrap();
        let mut expected = before;
        expected.ancho = 500;
        assert_eq!(after, expected);
    }

    #[test]
    fn test_update_enum_fields() {
        let storage = setup();
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        let id = storage.list_overlays().unwrap()[0].id.unwrap();

        let update = OverlayUpdate {
            fondo: Some(Fondo::Opacidad),
            transicion: Some(Transicion::Difuminado),
            tiempo_inicio: Some(3.5),
            ..Default::default()
        };
        storage.update_overlay(id, &update).unwrap();

        let after = storage.get_overlay(id).unwrap().unwrap();
        assert_eq!(after.fondo, Fondo::Opacidad);
        assert_eq!(after.transicion, Transicion::Difuminado);
        assert!((after.tiempo_inicio - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let storage = setup();
        storage.replace_overlays(&[overlay("a.png", 1.0)]).unwrap();
        let before = storage.list_overlays().unwrap();

        let update = OverlayUpdate {
            ancho: Some(1),
            ..Default::default()
        };
        assert_eq!(storage.update_overlay(424_242, &update).unwrap(), 0);
        assert_eq!(storage.list_overlays().unwrap(), before);
    }

    #[test]
    fn test_update_empty_rejected() {
        let storage = setup();
        let err = storage
            .update_overlay(1, &OverlayUpdate::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::EmptyUpdate { id: 1 })
        ));
    }

    #[test]
    fn test_get_overlay_missing() {
        let storage = setup();
        assert!(storage.get_overlay(1).unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let storage = setup();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.overlay_count, 0);
        assert_eq!(stats.timeline_end, None);
        assert_eq!(stats.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(stats.db_size.is_none());

        storage
            .replace_overlays(&[overlay("a.png", 1.0), overlay("b.png", 5.0)])
            .unwrap();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.overlay_count, 2);
        assert!((stats.total_duration - 4.0).abs() < f64::EPSILON);
        assert_eq!(stats.timeline_end, Some(7.0));
    }

    #[test]
    fn test_stats_fails_on_corrupt_schema_version() {
        let storage = setup();
        raw_execute(
            &storage,
            "UPDATE schema_info SET value = 'one' WHERE key = 'version'",
        )
        .unwrap();

        let err = storage.stats().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Query(_))));
    }

    #[test]
    fn test_unopenable_path_is_initialization_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let storage = SqliteStorage::open(blocker.join("overlays.db"));

        let err = storage.init().unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::Initialization(_))
        ));

        // A failed open is not cached; the next operation tries again
        let err = storage.list_overlays().unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::Initialization(_))
        ));
        assert!(!storage.is_initialized().unwrap());
    }

    #[test]
    fn test_is_initialized_reflects_this_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("overlays.db");
        SqliteStorage::open(&path).init().unwrap();

        let storage = SqliteStorage::open(&path);
        assert!(!storage.is_initialized().unwrap());
        storage.init().unwrap();
        assert!(storage.is_initialized().unwrap());
    }

    #[test]
    fn test_open_is_lazy() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("overlays.db");
        let storage = SqliteStorage::open(&path);
        assert_eq!(storage.path(), Some(path.as_path()));
        assert!(!path.exists());

        storage.init().unwrap();
        assert!(path.exists());
    }
}
