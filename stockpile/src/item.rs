//! Item types for tracking stock and reservation state.
//!
//! This module provides the item record owned by the item store, the
//! reservation fields it carries, and the snapshot handed back to request
//! layers.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A unique identifier for an item.
///
/// Identifiers are opaque strings, trimmed of surrounding whitespace and
/// required to be non-empty.
///
/// # Examples
///
/// ```
/// use stockpile::ItemId;
///
/// let id = ItemId::new("  widget-42 ").unwrap();
/// assert_eq!(id.as_str(), "widget-42");
///
/// assert!(ItemId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty after trimming whitespace
    /// or contains a null byte.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError {
                field: "item_id".into(),
                message: "item id must be non-empty after trimming whitespace".into(),
            });
        }
        if trimmed.contains('\0') {
            return Err(ValidationError {
                field: "item_id".into(),
                message: "item id cannot contain null bytes".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The persisted fields of an active reservation.
///
/// An item without a reservation carries `None` instead, which keeps the
/// duration and start time unset whenever the item is not reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Quantity removed from the available stock when the reservation began.
    pub quantity: u32,
    /// When the reservation began (or was re-armed).
    pub started_at: DateTime<Utc>,
    /// Total lifetime of the reservation measured from `started_at`.
    pub duration_ms: u64,
}

impl ReservationRecord {
    /// Returns the instant at which the reservation lapses.
    ///
    /// Durations too large to represent saturate to the latest
    /// representable timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use stockpile::ReservationRecord;
    ///
    /// let started_at = Utc.timestamp_millis_opt(1_000).unwrap();
    /// let record = ReservationRecord { quantity: 4, started_at, duration_ms: 500 };
    /// assert_eq!(record.expires_at().timestamp_millis(), 1_500);
    /// ```
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.duration_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|delta| self.started_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns the time left before expiry, or zero if already past.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at() - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns whether the reservation has lapsed at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now
    }
}

/// An inventory item as stored by the item store.
///
/// # Examples
///
/// ```
/// use stockpile::{Item, ItemId};
///
/// let item = Item::builder(ItemId::new("X").unwrap(), "Widget")
///     .location(Some("Aisle 4".to_string()))
///     .quantity_available(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(item.quantity_available(), 10);
/// assert!(!item.is_reserved());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    location: Option<String>,
    price: f64,
    quantity_available: u32,
    reservation: Option<ReservationRecord>,
}

impl Item {
    /// Creates a new item builder.
    #[must_use]
    pub fn builder(id: ItemId, name: impl Into<String>) -> ItemBuilder {
        ItemBuilder {
            id,
            name: name.into(),
            location: None,
            price: 0.0,
            quantity_available: 0,
            reservation: None,
        }
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional storage location.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the unit price.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// Returns the stock not currently reserved.
    #[must_use]
    pub const fn quantity_available(&self) -> u32 {
        self.quantity_available
    }

    /// Returns the active reservation, if any.
    #[must_use]
    pub const fn reservation(&self) -> Option<&ReservationRecord> {
        self.reservation.as_ref()
    }

    /// Returns whether a reservation is active.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.reservation.is_some()
    }

    /// Returns a copy of this item with new stock fields applied.
    #[must_use]
    pub fn with_stock(&self, update: &StockUpdate) -> Self {
        Self {
            quantity_available: update.quantity_available,
            reservation: update.reservation,
            ..self.clone()
        }
    }
}

/// Builder for creating `Item` instances.
#[derive(Debug)]
pub struct ItemBuilder {
    id: ItemId,
    name: String,
    location: Option<String>,
    price: f64,
    quantity_available: u32,
    reservation: Option<ReservationRecord>,
}

impl ItemBuilder {
    /// Sets the storage location.
    ///
    /// The location string will be trimmed of leading/trailing whitespace.
    #[must_use]
    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = location.map(|l| l.trim().to_string());
        self
    }

    /// Sets the unit price.
    #[must_use]
    pub const fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Sets the available quantity.
    #[must_use]
    pub const fn quantity_available(mut self, quantity: u32) -> Self {
        self.quantity_available = quantity;
        self
    }

    /// Sets the active reservation.
    #[must_use]
    pub const fn reservation(mut self, reservation: Option<ReservationRecord>) -> Self {
        self.reservation = reservation;
        self
    }

    /// Builds the item.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty after trimming
    /// - The location is provided but is empty after trimming
    /// - The price is negative or not finite
    /// - The reservation has a zero quantity or duration
    pub fn build(self) -> Result<Item, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError {
                field: "name".into(),
                message: "name must be non-empty after trimming whitespace".into(),
            });
        }

        if let Some(ref location) = self.location {
            if location.is_empty() {
                return Err(ValidationError {
                    field: "location".into(),
                    message: "location must be non-empty after trimming whitespace".into(),
                });
            }
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError {
                field: "price".into(),
                message: format!("price must be a non-negative number, got {}", self.price),
            });
        }

        if let Some(ref reservation) = self.reservation {
            if reservation.quantity == 0 || reservation.duration_ms == 0 {
                return Err(ValidationError {
                    field: "reservation".into(),
                    message: "reservation quantity and duration must be greater than 0".into(),
                });
            }
        }

        Ok(Item {
            id: self.id,
            name,
            location: self.location,
            price: self.price,
            quantity_available: self.quantity_available,
            reservation: self.reservation,
        })
    }
}

/// New values for the stock fields of one item, written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockUpdate {
    /// New available quantity.
    pub quantity_available: u32,
    /// New reservation state; `None` clears it.
    pub reservation: Option<ReservationRecord>,
}

/// Flattened, serializable view of an item returned by engine operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    /// Item identifier.
    pub id: ItemId,
    /// Item name.
    pub name: String,
    /// Storage location.
    pub location: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Stock not currently reserved.
    pub quantity_available: u32,
    /// Whether a reservation is active.
    pub reserved: bool,
    /// Quantity held by the active reservation, `0` when not reserved.
    pub reserved_quantity: u32,
    /// Total reservation lifetime, `0` when not reserved.
    pub reservation_duration_ms: u64,
    /// When the reservation began.
    pub reservation_started_at: Option<DateTime<Utc>>,
    /// When the reservation lapses.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Item> for ItemSnapshot {
    fn from(item: &Item) -> Self {
        let reservation = item.reservation();
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            location: item.location.clone(),
            price: item.price,
            quantity_available: item.quantity_available,
            reserved: reservation.is_some(),
            reserved_quantity: reservation.map_or(0, |r| r.quantity),
            reservation_duration_ms: reservation.map_or(0, |r| r.duration_ms),
            reservation_started_at: reservation.map(|r| r.started_at),
            expires_at: reservation.map(ReservationRecord::expires_at),
        }
    }
}

impl From<Item> for ItemSnapshot {
    fn from(item: Item) -> Self {
        Self::from(&item)
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}
