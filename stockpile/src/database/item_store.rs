//! [`ItemStore`] backed by a `SQLite` database.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::item::{Item, ItemId, ReservationRecord, StockUpdate};
use crate::store::ItemStore;

use super::config::DatabaseConfig;
use super::connection::Database;

/// Durable item store on top of a single `SQLite` connection.
///
/// The connection is serialized behind a mutex; `SQLite` itself arbitrates
/// between processes through its file locks and the configured busy timeout.
///
/// # Examples
///
/// ```no_run
/// use stockpile::database::{DatabaseConfig, SqliteItemStore};
/// use stockpile::ItemStore;
///
/// let store = SqliteItemStore::open(DatabaseConfig::new("/tmp/stockpile.db")).unwrap();
/// println!("{} items", store.list_items().unwrap().len());
/// ```
#[derive(Debug)]
pub struct SqliteItemStore {
    db: Mutex<Database>,
}

impl SqliteItemStore {
    /// Opens the database described by `config` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Database::open`] fails.
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        Ok(Self::new(Database::open(config)?))
    }

    /// Wraps an already opened database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ItemStore for SqliteItemStore {
    fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        self.db().get_item(id)
    }

    fn list_items(&self) -> Result<Vec<Item>> {
        self.db().list_items()
    }

    fn reserved_items(&self) -> Result<Vec<Item>> {
        self.db().list_reserved_items()
    }

    fn insert_item(&self, item: &Item) -> Result<()> {
        self.db().insert_item(item)
    }

    fn set_quantity(&self, id: &ItemId, quantity: u32) -> Result<bool> {
        self.db().set_quantity(id, quantity)
    }

    fn set_reservation(
        &self,
        id: &ItemId,
        reservation: Option<ReservationRecord>,
    ) -> Result<bool> {
        self.db().set_reservation(id, reservation.as_ref())
    }

    fn update_stock(
        &self,
        id: &ItemId,
        expected_reserved: bool,
        update: &StockUpdate,
    ) -> Result<bool> {
        self.db().update_stock(id, expected_reserved, update)
    }
}
