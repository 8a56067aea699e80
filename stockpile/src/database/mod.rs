//! Database layer for persistent storage of items.
//!
//! This module provides a SQLite-based storage layer for inventory items and
//! their reservation columns, including connection management, schema
//! versioning, and CRUD operations. [`SqliteItemStore`] adapts it to the
//! [`ItemStore`](crate::ItemStore) interface used by the reservation engine.
//!
//! # Examples
//!
//! ```no_run
//! use stockpile::database::{Database, DatabaseConfig};
//! use stockpile::{Item, ItemId};
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/stockpile.db")).unwrap();
//!
//! let item = Item::builder(ItemId::new("X").unwrap(), "Widget")
//!     .quantity_available(10)
//!     .build()
//!     .unwrap();
//! db.insert_item(&item).unwrap();
//!
//! for item in db.list_items().unwrap() {
//!     println!("{}: {}", item.id(), item.quantity_available());
//! }
//! ```

mod config;
mod connection;
mod init;
mod item_store;
pub mod migrations;
mod operations;
mod schema;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export public API
pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig, DATABASE_FILE_NAME,
};
pub use connection::Database;
pub use init::{init_data_dir, InitOptions, InitResult, DEFAULT_CONFIG_TEMPLATE};
pub use item_store::SqliteItemStore;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
