//! Database schema definitions.
//!
//! Contains the SQL for the overlay `SQLite` database.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL schema for initial database setup. Every statement is idempotent.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Timed image overlays
CREATE TABLE IF NOT EXISTS overlays (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_imagen TEXT NOT NULL,
    posicion_x INTEGER NOT NULL,
    posicion_y INTEGER NOT NULL,
    ancho INTEGER NOT NULL,
    tiempo_inicio REAL NOT NULL,
    duracion REAL NOT NULL,
    fondo TEXT NOT NULL CHECK (fondo IN ('transparente', 'opacidad')),
    transicion TEXT NOT NULL CHECK (transicion IN ('difuminado', 'lateral'))
);

-- Canonical read order
CREATE INDEX IF NOT EXISTS idx_overlays_start ON overlays(tiempo_inicio);
";

/// SQL to check if the overlays table exists.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='overlays';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// Column list shared by every overlay SELECT.
pub const SELECT_COLUMNS: &str = "id, url_imagen, posicion_x, posicion_y, ancho, \
     tiempo_inicio, duracion, fondo, transicion";

/// SQL to insert one overlay; the id is assigned by the engine.
pub const INSERT_OVERLAY_SQL: &str = r"
INSERT INTO overlays (
    url_imagen, posicion_x, posicion_y, ancho,
    tiempo_inicio, duracion, fondo, transicion
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";
