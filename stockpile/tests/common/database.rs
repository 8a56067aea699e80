//! Shared database test utilities.

use std::path::{Path, PathBuf};

use stockpile::database::{Database, DatabaseConfig, SqliteItemStore};

/// Path of a fresh database file inside `dir`.
#[allow(dead_code)]
pub fn database_path(dir: &Path) -> PathBuf {
    dir.join("stockpile.db")
}

/// Opens a `SQLite` item store in `dir`, creating the database if needed.
#[allow(dead_code)]
pub fn open_store(dir: &Path) -> SqliteItemStore {
    SqliteItemStore::open(DatabaseConfig::new(database_path(dir))).unwrap()
}

/// Opens a raw database handle in `dir`.
#[allow(dead_code)]
pub fn open_database(dir: &Path) -> Database {
    Database::open(DatabaseConfig::new(database_path(dir))).unwrap()
}
