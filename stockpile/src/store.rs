//! The item store interface consumed by the reservation engine.
//!
//! The engine never talks to a database directly. It reads and writes item
//! records through [`ItemStore`], so any durable key/record store reachable
//! by item identifier can back it. Two implementations ship with the crate:
//! [`SqliteItemStore`](crate::database::SqliteItemStore) for persistence and
//! [`InMemoryItemStore`] for tests and embedding.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, ReservationRecord, StockUpdate};

/// Durable mapping from item identifier to item record.
///
/// Implementations must be safe to share between request threads and the
/// scheduler worker. Every failure of the backing storage is reported as
/// [`Error::Store`]; the engine does not interpret store-specific codes.
#[cfg_attr(test, mockall::automock)]
pub trait ItemStore: Send + Sync {
    /// Reads one item.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails. A missing item is `Ok(None)`.
    fn get_item(&self, id: &ItemId) -> Result<Option<Item>>;

    /// Lists every item ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails.
    fn list_items(&self) -> Result<Vec<Item>>;

    /// Lists items whose reservation flag is set.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails.
    fn reserved_items(&self) -> Result<Vec<Item>>;

    /// Inserts a new item.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails and
    /// [`Error::AlreadyExists`] if the identifier is taken.
    fn insert_item(&self, item: &Item) -> Result<()>;

    /// Overwrites the available quantity.
    ///
    /// Returns `true` iff exactly one record was affected.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    fn set_quantity(&self, id: &ItemId, quantity: u32) -> Result<bool>;

    /// Overwrites the reservation fields; `None` clears them.
    ///
    /// Returns `true` iff exactly one record was affected.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    fn set_reservation(&self, id: &ItemId, reservation: Option<ReservationRecord>)
        -> Result<bool>;

    /// Writes quantity and reservation fields together, but only if the
    /// item's reservation flag still equals `expected_reserved`.
    ///
    /// Returns `true` iff the record existed, matched and was updated.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    fn update_stock(&self, id: &ItemId, expected_reserved: bool, update: &StockUpdate)
        -> Result<bool>;
}

/// Item store held entirely in memory.
///
/// # Examples
///
/// ```
/// use stockpile::{InMemoryItemStore, Item, ItemId, ItemStore};
///
/// let store = InMemoryItemStore::new();
/// let id = ItemId::new("X").unwrap();
/// store
///     .insert_item(&Item::builder(id.clone(), "Widget").quantity_available(10).build().unwrap())
///     .unwrap();
///
/// assert!(store.set_quantity(&id, 7).unwrap());
/// assert_eq!(store.get_item(&id).unwrap().unwrap().quantity_available(), 7);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<BTreeMap<ItemId, Item>>,
}

impl InMemoryItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `items`.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.id().clone(), item))
            .collect();
        Self {
            items: RwLock::new(items),
        }
    }
}

impl ItemStore for InMemoryItemStore {
    fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(id).cloned())
    }

    fn list_items(&self) -> Result<Vec<Item>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.values().cloned().collect())
    }

    fn reserved_items(&self) -> Result<Vec<Item>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.values().filter(|i| i.is_reserved()).cloned().collect())
    }

    fn insert_item(&self, item: &Item) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.contains_key(item.id()) {
            return Err(Error::AlreadyExists {
                item_id: item.id().to_string(),
            });
        }
        items.insert(item.id().clone(), item.clone());
        Ok(())
    }

    fn set_quantity(&self, id: &ItemId, quantity: u32) -> Result<bool> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let Some(item) = items.get_mut(id) else {
            return Ok(false);
        };
        let update = StockUpdate {
            quantity_available: quantity,
            reservation: item.reservation().copied(),
        };
        *item = item.with_stock(&update);
        Ok(true)
    }

    fn set_reservation(
        &self,
        id: &ItemId,
        reservation: Option<ReservationRecord>,
    ) -> Result<bool> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let Some(item) = items.get_mut(id) else {
            return Ok(false);
        };
        let update = StockUpdate {
            quantity_available: item.quantity_available(),
            reservation,
        };
        *item = item.with_stock(&update);
        Ok(true)
    }

    fn update_stock(
        &self,
        id: &ItemId,
        expected_reserved: bool,
        update: &StockUpdate,
    ) -> Result<bool> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(id) {
            Some(item) if item.is_reserved() == expected_reserved => {
                *item = item.with_stock(update);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
