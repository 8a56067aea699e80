//! Database CRUD operations for items.
//!
//! This module implements all create, read, and update operations for
//! inventory items and their reservation columns.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, ReservationRecord, StockUpdate};

use super::connection::Database;

// SQL statements for CRUD operations
const ITEM_COLUMNS: &str = "id, name, location, price, quantity_available, reserved, \
     reserved_quantity, reservation_started_at, reservation_duration_ms";

const INSERT_ITEM: &str = r"
    INSERT INTO items
    (id, name, location, price, quantity_available, reserved,
     reserved_quantity, reservation_started_at, reservation_duration_ms)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE_QUANTITY: &str = r"
    UPDATE items
    SET quantity_available = ?
    WHERE id = ?
";

const UPDATE_RESERVATION: &str = r"
    UPDATE items
    SET reserved = ?, reserved_quantity = ?, reservation_started_at = ?,
        reservation_duration_ms = ?
    WHERE id = ?
";

const UPDATE_STOCK_IF_RESERVED: &str = r"
    UPDATE items
    SET quantity_available = ?, reserved = ?, reserved_quantity = ?,
        reservation_started_at = ?, reservation_duration_ms = ?
    WHERE id = ? AND reserved = ?
";

/// Reservation columns in their stored representation.
struct ReservationColumns {
    reserved: bool,
    quantity: u32,
    started_at_ms: Option<i64>,
    duration_ms: i64,
}

impl ReservationColumns {
    fn from_record(record: Option<&ReservationRecord>) -> Result<Self> {
        match record {
            None => Ok(Self {
                reserved: false,
                quantity: 0,
                started_at_ms: None,
                duration_ms: 0,
            }),
            Some(record) => Ok(Self {
                reserved: true,
                quantity: record.quantity,
                started_at_ms: Some(record.started_at.timestamp_millis()),
                duration_ms: i64::try_from(record.duration_ms).map_err(|_| Error::Validation {
                    field: "reservation_duration_ms".into(),
                    message: format!("duration {} ms cannot be stored", record.duration_ms),
                })?,
            }),
        }
    }
}

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Integer,
        message.into(),
    )
}

/// Helper function to deserialize an item from a database row.
///
/// Expects row fields in the order of `ITEM_COLUMNS`.
fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let location: Option<String> = row.get(2)?;
    let price: f64 = row.get(3)?;
    let quantity_available: u32 = row.get(4)?;
    let reserved: bool = row.get(5)?;
    let reserved_quantity: u32 = row.get(6)?;
    let started_at_ms: Option<i64> = row.get(7)?;
    let duration_ms: i64 = row.get(8)?;

    let reservation = if reserved {
        let started_at = started_at_ms
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| {
                conversion_error(format!("item {id} is reserved without a valid start time"))
            })?;
        let duration_ms = u64::try_from(duration_ms)
            .map_err(|_| conversion_error(format!("item {id} has a negative duration")))?;
        Some(ReservationRecord {
            quantity: reserved_quantity,
            started_at,
            duration_ms,
        })
    } else {
        None
    };

    let id = ItemId::new(id).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Item::builder(id, name)
        .location(location)
        .price(price)
        .quantity_available(quantity_available)
        .reservation(reservation)
        .build()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

impl Database {
    /// Inserts a new item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if an item with the same identifier
    /// is present, or a store error if the insert fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stockpile::database::{Database, DatabaseConfig};
    /// use stockpile::{Item, ItemId};
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/stockpile.db")).unwrap();
    /// let item = Item::builder(ItemId::new("X").unwrap(), "Widget")
    ///     .quantity_available(10)
    ///     .build()
    ///     .unwrap();
    /// db.insert_item(&item).unwrap();
    /// ```
    pub fn insert_item(&mut self, item: &Item) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM items WHERE id = ?",
            [item.id().as_str()],
            |row| row.get(0),
        )?;
        if exists {
            return Err(Error::AlreadyExists {
                item_id: item.id().to_string(),
            });
        }

        let columns = ReservationColumns::from_record(item.reservation())?;
        tx.execute(
            INSERT_ITEM,
            params![
                item.id().as_str(),
                item.name(),
                item.location(),
                item.price(),
                item.quantity_available(),
                columns.reserved,
                columns.quantity,
                columns.started_at_ms,
                columns.duration_ms,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Retrieves an item by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.query_row([id.as_str()], row_to_item).optional()?)
    }

    /// Lists all items, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Lists the items that currently hold a reservation, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_reserved_items(&self) -> Result<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE reserved = 1 ORDER BY id");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Overwrites the available quantity of an item.
    ///
    /// Returns `true` if the item existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: u32) -> Result<bool> {
        let rows = self
            .conn
            .execute(UPDATE_QUANTITY, params![quantity, id.as_str()])?;
        Ok(rows == 1)
    }

    /// Overwrites the reservation columns of an item.
    ///
    /// Returns `true` if the item existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_reservation(
        &mut self,
        id: &ItemId,
        reservation: Option<&ReservationRecord>,
    ) -> Result<bool> {
        let columns = ReservationColumns::from_record(reservation)?;
        let rows = self.conn.execute(
            UPDATE_RESERVATION,
            params![
                columns.reserved,
                columns.quantity,
                columns.started_at_ms,
                columns.duration_ms,
                id.as_str(),
            ],
        )?;
        Ok(rows == 1)
    }

    /// Writes quantity and reservation columns in one statement, guarded by
    /// the current value of the reserved flag.
    ///
    /// This operation uses a transaction with IMMEDIATE mode so that a
    /// concurrent writer in another process cannot slip between the guard
    /// and the write.
    ///
    /// Returns `true` if a row matched both the identifier and the expected
    /// flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or the update fails.
    pub fn update_stock(
        &mut self,
        id: &ItemId,
        expected_reserved: bool,
        update: &StockUpdate,
    ) -> Result<bool> {
        let columns = ReservationColumns::from_record(update.reservation.as_ref())?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rows = tx.execute(
            UPDATE_STOCK_IF_RESERVED,
            params![
                update.quantity_available,
                columns.reserved,
                columns.quantity,
                columns.started_at_ms,
                columns.duration_ms,
                id.as_str(),
                expected_reserved,
            ],
        )?;

        tx.commit()?;
        Ok(rows == 1)
    }
}
