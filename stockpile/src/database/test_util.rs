//! Shared test utilities for database unit tests.
//!
//! This module provides helper functions used across multiple database test modules.

use tempfile::tempdir;

use crate::database::{Database, DatabaseConfig};
use crate::{Item, ItemId};

/// Creates a temporary test database that will be cleaned up automatically.
///
/// # Panics
///
/// Panics if the temporary directory or database cannot be created.
/// This is acceptable in test code where we want to fail fast.
#[must_use]
pub fn create_test_database() -> Database {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let config = DatabaseConfig::new(path);
    let db = Database::open(config).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    db
}

/// Creates an unreserved test item with the given identifier and quantity.
///
/// # Panics
///
/// Panics if the identifier or item is invalid.
#[must_use]
pub fn create_test_item(id: &str, quantity: u32) -> Item {
    Item::builder(ItemId::new(id).unwrap(), format!("Item {id}"))
        .location(Some("Warehouse A".to_string()))
        .price(9.5)
        .quantity_available(quantity)
        .build()
        .unwrap()
}
