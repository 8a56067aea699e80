//! Database schema definitions and SQL constants.
//!
//! This module contains all SQL table definitions, indices, and constants
//! related to the database schema for the stockpile item store.

/// Current schema version for the database.
///
/// This version is stored in the metadata table and is used to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
///
/// The metadata table stores key-value pairs for database configuration
/// and versioning information.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the items table.
///
/// Reservation columns are flattened onto the item row. A row that is not
/// reserved keeps `reserved_quantity` and `reservation_duration_ms` at 0 and
/// `reservation_started_at` NULL; the CHECK constraints enforce that.
pub const CREATE_ITEMS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        location TEXT,
        price REAL NOT NULL DEFAULT 0,
        quantity_available INTEGER NOT NULL CHECK (quantity_available >= 0),
        reserved INTEGER NOT NULL DEFAULT 0,
        reserved_quantity INTEGER NOT NULL DEFAULT 0,
        reservation_started_at INTEGER,
        reservation_duration_ms INTEGER NOT NULL DEFAULT 0,
        CHECK (reserved = 1 OR (
            reserved_quantity = 0
            AND reservation_duration_ms = 0
            AND reservation_started_at IS NULL
        ))
    )";

/// SQL statement to create an index on the reserved flag.
///
/// This index speeds up recovery and overdue sweeps, which only look at
/// reserved rows.
pub const CREATE_RESERVED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_items_reserved ON items(reserved)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";
