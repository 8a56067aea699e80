//! The reservation engine.
//!
//! [`ReservationEngine`] owns the per-item reservation state machine. Each
//! item has its own mutex, created on first use, that serializes every
//! read-modify-write of that item: request operations, stock adjustments and
//! expirations delivered by the [`Scheduler`]. Every transition bumps the
//! item's generation, and an expiration only acts if it carries the current
//! generation, so a timer that lost a race against `extend` or `cancel`
//! becomes a no-op.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use stockpile::{InMemoryItemStore, Item, ItemId, ReservationEngine, Scheduler};
//!
//! let id = ItemId::new("X").unwrap();
//! let store = Arc::new(InMemoryItemStore::with_items([
//!     Item::builder(id.clone(), "Widget").quantity_available(10).build().unwrap(),
//! ]));
//! let engine = ReservationEngine::builder(store, Arc::new(Scheduler::new()))
//!     .build()
//!     .unwrap();
//!
//! let snapshot = engine.reserve(&id, 4, 60_000).unwrap();
//! assert_eq!(snapshot.quantity_available, 6);
//! assert!(snapshot.reserved);
//!
//! let snapshot = engine.cancel(&id, 4).unwrap();
//! assert_eq!(snapshot.quantity_available, 10);
//! ```

mod options;
mod retry;
mod scheduler;
mod sink;
mod ticket;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{SubsecRound, Utc};

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, ItemSnapshot, ReservationRecord, StockUpdate};
use crate::store::ItemStore;

pub use options::EngineOptions;
pub use retry::RetryPolicy;
pub use scheduler::{ExpirationHandler, Scheduler, TimerHandle};
pub use sink::{ExpiryFailureSink, LogFailureSink};

use ticket::{ItemSlot, Ticket};

/// Outcome of [`ReservationEngine::recover`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Persisted reservations whose deadline had passed and were released.
    pub released: usize,
    /// Persisted reservations that got a fresh timer for their remaining time.
    pub rearmed: usize,
}

/// Builder for [`ReservationEngine`].
pub struct EngineBuilder {
    store: Arc<dyn ItemStore>,
    scheduler: Arc<Scheduler>,
    options: EngineOptions,
    sink: Arc<dyn ExpiryFailureSink>,
}

impl EngineBuilder {
    /// Sets the engine options.
    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets where exhausted expirations are reported. Defaults to
    /// [`LogFailureSink`].
    #[must_use]
    pub fn failure_sink(mut self, sink: Arc<dyn ExpiryFailureSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Starts the scheduler worker and, if enabled, runs recovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is shut down or already attached to
    /// another engine, if the worker thread cannot be spawned, or if
    /// recovery fails.
    pub fn build(self) -> Result<ReservationEngine> {
        let recover = self.options.recover_on_start;
        let inner = Arc::new(EngineInner {
            store: self.store,
            scheduler: self.scheduler,
            options: self.options,
            sink: self.sink,
            slots: Mutex::new(HashMap::new()),
        });

        let handler: Weak<EngineInner> = Arc::downgrade(&inner);
        inner.scheduler.start(handler)?;

        let engine = ReservationEngine { inner };
        if recover {
            let report = engine.recover()?;
            if report.released > 0 || report.rearmed > 0 {
                log::info!(
                    "recovered reservations: {} released, {} re-armed",
                    report.released,
                    report.rearmed
                );
            }
        }
        Ok(engine)
    }
}

/// Reservation lifecycle manager for items in an [`ItemStore`].
///
/// Cloning is cheap and yields another handle to the same engine.
#[derive(Clone)]
pub struct ReservationEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for ReservationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationEngine")
            .field("options", &self.inner.options)
            .field("pending_timers", &self.inner.scheduler.pending())
            .finish_non_exhaustive()
    }
}

impl ReservationEngine {
    /// Starts building an engine over `store`, delivering expirations
    /// through `scheduler`.
    #[must_use]
    pub fn builder(store: Arc<dyn ItemStore>, scheduler: Arc<Scheduler>) -> EngineBuilder {
        EngineBuilder {
            store,
            scheduler,
            options: EngineOptions::default(),
            sink: Arc::new(LogFailureSink),
        }
    }

    /// Reserves `quantity` units of an item for `duration_ms` milliseconds.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `quantity` or `duration_ms` is zero, or the
    ///   duration exceeds the configured maximum
    /// - [`Error::NotFound`] if the item does not exist
    /// - [`Error::ReservationConflict`] if the item is already reserved
    /// - [`Error::InsufficientQuantity`] if fewer than `quantity` units are available
    /// - [`Error::ShuttingDown`] if the scheduler has stopped
    /// - [`Error::Store`] if the store fails
    pub fn reserve(&self, id: &ItemId, quantity: u32, duration_ms: u64) -> Result<ItemSnapshot> {
        self.inner.reserve(id, quantity, duration_ms)
    }

    /// Lengthens an active reservation by `additional_ms`.
    ///
    /// The start time is kept, so the new deadline is the old one plus
    /// `additional_ms`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `additional_ms` is zero or the total
    ///   duration overflows or exceeds the configured maximum
    /// - [`Error::NotFound`] if the item does not exist
    /// - [`Error::NotReserved`] if the item has no active reservation
    /// - [`Error::ShuttingDown`] if the scheduler has stopped
    /// - [`Error::Store`] if the store fails
    pub fn extend(&self, id: &ItemId, additional_ms: u64) -> Result<ItemSnapshot> {
        self.inner.extend(id, additional_ms)
    }

    /// Ends an active reservation early and returns its stock.
    ///
    /// The quantity restored is always the quantity recorded when the
    /// reservation was made; a different `quantity` is logged and ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `quantity` is zero
    /// - [`Error::NotFound`] if the item does not exist
    /// - [`Error::NotReserved`] if the item has no active reservation
    /// - [`Error::Store`] if the store fails
    pub fn cancel(&self, id: &ItemId, quantity: u32) -> Result<ItemSnapshot> {
        self.inner.cancel(id, quantity)
    }

    /// Reads the current state of an item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the item does not exist, or a store error.
    pub fn status(&self, id: &ItemId) -> Result<ItemSnapshot> {
        self.inner.require_item(id).map(ItemSnapshot::from)
    }

    /// Lists every item.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails.
    pub fn list(&self) -> Result<Vec<ItemSnapshot>> {
        Ok(self
            .inner
            .store
            .list_items()?
            .into_iter()
            .map(ItemSnapshot::from)
            .collect())
    }

    /// Adds a new item to the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] for a duplicate identifier, or a
    /// store error.
    pub fn add_item(&self, item: &Item) -> Result<ItemSnapshot> {
        let slot = self.inner.slot(item.id());
        let _guard = lock_slot(&slot);
        self.inner.store.insert_item(item)?;
        log::info!("added item {} with {} available", item.id(), item.quantity_available());
        Ok(ItemSnapshot::from(item))
    }

    /// Overwrites the available quantity of an item.
    ///
    /// Runs under the item's lock, so it never interleaves with a
    /// reservation transition on the same item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the item does not exist, or a store error.
    pub fn set_quantity(&self, id: &ItemId, quantity: u32) -> Result<ItemSnapshot> {
        let slot = self.inner.slot(id);
        let _guard = lock_slot(&slot);
        if !self.inner.store.set_quantity(id, quantity)? {
            return Err(not_found(id));
        }
        log::info!("set quantity of {id} to {quantity}");
        self.inner.require_item(id).map(ItemSnapshot::from)
    }

    /// Rebuilds timers for reservations persisted in the store.
    ///
    /// Reservations whose deadline has passed are released; the rest are
    /// re-armed for their remaining time. Items that already have an armed
    /// timer in this engine are left alone.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub fn recover(&self) -> Result<RecoveryReport> {
        self.inner.recover()
    }

    /// Releases every persisted reservation whose deadline has passed.
    ///
    /// With `dry_run` nothing is written and the overdue items are only
    /// reported. Returns the released (or would-be released) items.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub fn release_overdue(&self, dry_run: bool) -> Result<Vec<ItemSnapshot>> {
        self.inner.release_overdue(dry_run)
    }

    /// Number of expirations currently armed.
    #[must_use]
    pub fn pending_expirations(&self) -> usize {
        self.inner.scheduler.pending()
    }

    /// Stops the scheduler. Pending expirations are dropped; they remain
    /// persisted and are picked up by [`recover`](Self::recover) later.
    pub fn shutdown(&self) {
        self.inner.scheduler.shutdown();
    }
}

struct EngineInner {
    store: Arc<dyn ItemStore>,
    scheduler: Arc<Scheduler>,
    options: EngineOptions,
    sink: Arc<dyn ExpiryFailureSink>,
    slots: Mutex<HashMap<ItemId, Arc<Mutex<ItemSlot>>>>,
}

fn lock_slot(slot: &Mutex<ItemSlot>) -> MutexGuard<'_, ItemSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_found(id: &ItemId) -> Error {
    Error::NotFound {
        item_id: id.to_string(),
    }
}

fn not_reserved(id: &ItemId) -> Error {
    Error::NotReserved {
        item_id: id.to_string(),
    }
}

impl EngineInner {
    fn slot(&self, id: &ItemId) -> Arc<Mutex<ItemSlot>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id.clone()).or_default())
    }

    fn require_item(&self, id: &ItemId) -> Result<Item> {
        self.store.get_item(id)?.ok_or_else(|| not_found(id))
    }

    fn check_duration(&self, duration_ms: u64) -> Result<()> {
        match self.options.max_duration_ms {
            Some(max) if duration_ms > max => Err(Error::validation(
                "duration_ms",
                format!("reservation duration {duration_ms} ms exceeds the maximum of {max} ms"),
            )),
            _ => Ok(()),
        }
    }

    fn ensure_running(&self) -> Result<()> {
        if self.scheduler.is_running() {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }

    /// Arms a timer after the store write already happened.
    ///
    /// Arming only fails if the scheduler stopped after `ensure_running`;
    /// the reservation is persisted and will be picked up by recovery, the
    /// same as any timer dropped at shutdown.
    fn arm(&self, id: &ItemId, delay: Duration, generation: u64) -> Option<TimerHandle> {
        match self.scheduler.arm(id, delay, generation) {
            Ok(timer) => Some(timer),
            Err(err) => {
                log::warn!("no expiration armed for {id}: {err}");
                None
            }
        }
    }

    /// Installs a ticket for `record` and arms its timer.
    fn install_ticket(&self, slot: &mut ItemSlot, id: &ItemId, record: &ReservationRecord) {
        let generation = slot.advance();
        let delay = record.remaining(Utc::now());
        let timer = self.arm(id, delay, generation);
        slot.ticket = Some(Ticket {
            reserved_quantity: record.quantity,
            expires_at: record.expires_at(),
            generation,
            timer,
            failed_attempts: 0,
        });
    }

    /// Returns `restore` units to the item and clears its reservation.
    ///
    /// Returns the updated item, or `None` if the store no longer held the
    /// item as reserved. Either way the slot is cleared.
    fn release(&self, slot: &mut ItemSlot, item: &Item, restore: u32) -> Result<Option<Item>> {
        let quantity_available = item.quantity_available().checked_add(restore).ok_or_else(|| {
            Error::validation(
                "quantity_available",
                format!(
                    "returning {restore} units to {} would overflow its quantity",
                    item.id()
                ),
            )
        })?;
        let update = StockUpdate {
            quantity_available,
            reservation: None,
        };
        let written = self.store.update_stock(item.id(), true, &update)?;
        slot.clear(&self.scheduler);
        Ok(written.then(|| item.with_stock(&update)))
    }

    fn reserve(&self, id: &ItemId, quantity: u32, duration_ms: u64) -> Result<ItemSnapshot> {
        if quantity == 0 {
            return Err(Error::validation("quantity", "must be greater than 0"));
        }
        if duration_ms == 0 {
            return Err(Error::validation("duration_ms", "must be greater than 0"));
        }
        self.check_duration(duration_ms)?;
        self.ensure_running()?;

        let slot = self.slot(id);
        let mut slot = lock_slot(&slot);

        let item = self.require_item(id)?;
        if item.is_reserved() || slot.ticket.is_some() {
            return Err(Error::ReservationConflict {
                details: format!("item {id} is already reserved"),
            });
        }
        if item.quantity_available() < quantity {
            return Err(Error::InsufficientQuantity {
                item_id: id.to_string(),
                requested: quantity,
                available: item.quantity_available(),
            });
        }

        // Millisecond precision, matching what stores persist.
        let record = ReservationRecord {
            quantity,
            started_at: Utc::now().trunc_subsecs(3),
            duration_ms,
        };
        let update = StockUpdate {
            quantity_available: item.quantity_available() - quantity,
            reservation: Some(record),
        };
        if !self.store.update_stock(id, false, &update)? {
            // Lost to a writer outside this engine.
            return Err(match self.store.get_item(id)? {
                None => not_found(id),
                Some(_) => Error::ReservationConflict {
                    details: format!("item {id} was reserved concurrently"),
                },
            });
        }

        self.install_ticket(&mut slot, id, &record);
        log::info!(
            "reserved {quantity} of {id} for {duration_ms} ms (expires {})",
            record.expires_at()
        );
        Ok(ItemSnapshot::from(item.with_stock(&update)))
    }

    fn extend(&self, id: &ItemId, additional_ms: u64) -> Result<ItemSnapshot> {
        if additional_ms == 0 {
            return Err(Error::validation("additional_ms", "must be greater than 0"));
        }

        let slot = self.slot(id);
        let mut slot = lock_slot(&slot);

        let item = self.require_item(id)?;
        let Some(record) = item.reservation().copied() else {
            return Err(not_reserved(id));
        };
        let duration_ms = record.duration_ms.checked_add(additional_ms).ok_or_else(|| {
            Error::validation("additional_ms", "total reservation duration overflows")
        })?;
        self.check_duration(duration_ms)?;
        self.ensure_running()?;

        let extended = ReservationRecord {
            duration_ms,
            ..record
        };
        let update = StockUpdate {
            quantity_available: item.quantity_available(),
            reservation: Some(extended),
        };
        if !self.store.update_stock(id, true, &update)? {
            slot.clear(&self.scheduler);
            return Err(match self.store.get_item(id)? {
                None => not_found(id),
                Some(_) => not_reserved(id),
            });
        }

        // Old timer first, so at most one is ever armed for the item.
        if let Some(timer) = slot.ticket.as_mut().and_then(|t| t.timer.take()) {
            self.scheduler.disarm(timer);
        }
        self.install_ticket(&mut slot, id, &extended);
        log::info!(
            "extended reservation of {id} by {additional_ms} ms (expires {})",
            extended.expires_at()
        );
        Ok(ItemSnapshot::from(item.with_stock(&update)))
    }

    fn cancel(&self, id: &ItemId, quantity: u32) -> Result<ItemSnapshot> {
        if quantity == 0 {
            return Err(Error::validation("quantity", "must be greater than 0"));
        }

        let slot = self.slot(id);
        let mut slot = lock_slot(&slot);

        let item = self.require_item(id)?;
        let Some(record) = item.reservation().copied() else {
            return Err(not_reserved(id));
        };
        let restore = slot
            .ticket
            .as_ref()
            .map_or(record.quantity, |t| t.reserved_quantity);
        if quantity != restore {
            log::warn!(
                "cancel of {id} asked to return {quantity} units; returning the reserved {restore}"
            );
        }

        match self.release(&mut slot, &item, restore)? {
            Some(updated) => {
                log::info!("cancelled reservation of {id}, returned {restore}");
                Ok(ItemSnapshot::from(updated))
            }
            None => Err(match self.store.get_item(id)? {
                None => not_found(id),
                Some(_) => not_reserved(id),
            }),
        }
    }

    /// One attempt at persisting an expiration.
    fn try_expire(&self, id: &ItemId, slot: &mut ItemSlot) -> Result<()> {
        let Some(item) = self.store.get_item(id)? else {
            log::debug!("expired item {id} no longer exists");
            slot.clear(&self.scheduler);
            return Ok(());
        };
        let Some(record) = item.reservation().copied() else {
            log::debug!("expired item {id} was already released");
            slot.clear(&self.scheduler);
            return Ok(());
        };
        if !record.is_overdue(Utc::now()) {
            // Extended through another handle on the same store; follow the
            // persisted deadline.
            self.install_ticket(slot, id, &record);
            log::debug!("reservation of {id} now expires at {}", record.expires_at());
            return Ok(());
        }
        let restore = slot
            .ticket
            .as_ref()
            .map_or(record.quantity, |t| t.reserved_quantity);

        if self.release(slot, &item, restore)?.is_some() {
            log::info!("reservation of {id} expired, returned {restore}");
        } else {
            log::debug!("expiration of {id} found it already released");
        }
        Ok(())
    }

    fn recover(&self) -> Result<RecoveryReport> {
        let mut report = RecoveryReport::default();
        let now = Utc::now();

        for candidate in self.store.reserved_items()? {
            let id = candidate.id();
            let slot = self.slot(id);
            let mut slot = lock_slot(&slot);
            if slot.is_armed() {
                continue;
            }

            // Re-read under the lock; the listing may be stale.
            let Some(item) = self.store.get_item(id)? else {
                continue;
            };
            let Some(record) = item.reservation().copied() else {
                continue;
            };

            if record.is_overdue(now) {
                if self.release(&mut slot, &item, record.quantity)?.is_some() {
                    log::info!("released overdue reservation of {id} during recovery");
                    report.released += 1;
                }
            } else {
                self.install_ticket(&mut slot, id, &record);
                log::debug!(
                    "re-armed reservation of {id}, {:?} remaining",
                    record.remaining(now)
                );
                report.rearmed += 1;
            }
        }

        Ok(report)
    }

    fn release_overdue(&self, dry_run: bool) -> Result<Vec<ItemSnapshot>> {
        let now = Utc::now();
        let mut released = Vec::new();

        for candidate in self.store.reserved_items()? {
            let overdue = candidate.reservation().is_some_and(|r| r.is_overdue(now));
            if !overdue {
                continue;
            }
            if dry_run {
                released.push(ItemSnapshot::from(candidate));
                continue;
            }

            let id = candidate.id();
            let slot = self.slot(id);
            let mut slot = lock_slot(&slot);
            let Some(item) = self.store.get_item(id)? else {
                continue;
            };
            let Some(record) = item.reservation().copied() else {
                continue;
            };
            if !record.is_overdue(now) {
                continue;
            }
            let restore = slot
                .ticket
                .as_ref()
                .map_or(record.quantity, |t| t.reserved_quantity);
            if let Some(updated) = self.release(&mut slot, &item, restore)? {
                log::info!("released overdue reservation of {id}, returned {restore}");
                released.push(ItemSnapshot::from(updated));
            }
        }

        Ok(released)
    }
}

impl ExpirationHandler for EngineInner {
    fn on_expired(&self, id: &ItemId, generation: u64) {
        let slot = self.slot(id);
        let mut slot = lock_slot(&slot);

        let current = slot
            .ticket
            .as_ref()
            .is_some_and(|t| t.generation == generation);
        if slot.generation != generation || !current {
            log::debug!(
                "ignoring stale expiration of {id} (generation {generation}, current {})",
                slot.generation
            );
            return;
        }
        if let Some(ticket) = slot.ticket.as_mut() {
            // The firing timer is no longer pending.
            ticket.timer = None;
            log::debug!("reservation of {id} due at {}", ticket.expires_at);
        }

        let Err(err) = self.try_expire(id, &mut slot) else {
            return;
        };

        // Retry through the scheduler so neither this slot nor the worker
        // waits out the backoff.
        let policy = &self.options.expiry_retry;
        let attempts = policy.attempts();
        let Some(ticket) = slot.ticket.as_mut() else {
            self.sink.expiry_failed(id, 1, &err);
            return;
        };
        ticket.failed_attempts += 1;
        let attempt = ticket.failed_attempts;
        if attempt >= attempts {
            // Left reserved with no timer; cancel, recover or an overdue
            // sweep can still release it.
            self.sink.expiry_failed(id, attempt, &err);
            return;
        }

        let delay = policy.delay_for_attempt(attempt - 1);
        log::warn!(
            "expiring {id} failed (attempt {attempt}/{attempts}), retrying in {delay:?}: {err}"
        );
        ticket.timer = self.arm(id, delay, generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryItemStore, MockItemStore};
    use std::thread;
    use std::time::Instant;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    fn widget(s: &str, quantity: u32) -> Item {
        Item::builder(id(s), "Widget")
            .quantity_available(quantity)
            .build()
            .unwrap()
    }

    fn engine_with(store: Arc<dyn ItemStore>) -> ReservationEngine {
        ReservationEngine::builder(store, Arc::new(Scheduler::new()))
            .options(EngineOptions::default().with_recover_on_start(false))
            .build()
            .unwrap()
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not met in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        failures: Mutex<Vec<(String, u32)>>,
    }

    impl ExpiryFailureSink for RecordingSink {
        fn expiry_failed(&self, item_id: &ItemId, attempts: u32, _error: &Error) {
            self.failures
                .lock()
                .unwrap()
                .push((item_id.to_string(), attempts));
        }
    }

    #[test]
    fn test_zero_arguments_rejected_before_store_access() {
        // A mock with no expectations panics on any call.
        let engine = engine_with(Arc::new(MockItemStore::new()));
        let x = id("X");

        assert_eq!(engine.reserve(&x, 0, 10).unwrap_err().kind(), crate::ErrorKind::Validation);
        assert_eq!(engine.reserve(&x, 1, 0).unwrap_err().kind(), crate::ErrorKind::Validation);
        assert_eq!(engine.extend(&x, 0).unwrap_err().kind(), crate::ErrorKind::Validation);
        assert_eq!(engine.cancel(&x, 0).unwrap_err().kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_store_failure_propagates_without_retry() {
        let mut store = MockItemStore::new();
        store
            .expect_get_item()
            .times(1)
            .returning(|_| Err(Error::store("connection reset")));
        let engine = engine_with(Arc::new(store));

        let err = engine.reserve(&id("X"), 1, 1_000).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Store);
        assert_eq!(engine.pending_expirations(), 0);
    }

    #[test]
    fn test_failed_write_arms_nothing() {
        let mut store = MockItemStore::new();
        store
            .expect_get_item()
            .returning(|_| Ok(Some(widget("X", 10))));
        store
            .expect_update_stock()
            .times(1)
            .returning(|_, _, _| Err(Error::store("disk full")));
        let engine = engine_with(Arc::new(store));

        assert!(engine.reserve(&id("X"), 4, 1_000).is_err());
        assert_eq!(engine.pending_expirations(), 0);
    }

    #[test]
    fn test_lost_conditional_write_is_conflict() {
        let mut store = MockItemStore::new();
        store
            .expect_get_item()
            .returning(|_| Ok(Some(widget("X", 10))));
        store.expect_update_stock().returning(|_, _, _| Ok(false));
        let engine = engine_with(Arc::new(store));

        let err = engine.reserve(&id("X"), 4, 1_000).unwrap_err();
        assert!(matches!(err, Error::ReservationConflict { .. }));
    }

    #[test]
    fn test_max_duration_enforced() {
        let store = Arc::new(InMemoryItemStore::with_items([widget("X", 10)]));
        let engine = ReservationEngine::builder(store, Arc::new(Scheduler::new()))
            .options(EngineOptions::default().with_max_duration_ms(Some(1_000)))
            .build()
            .unwrap();

        assert!(engine.reserve(&id("X"), 1, 1_001).is_err());
        engine.reserve(&id("X"), 1, 600).unwrap();
        let err = engine.extend(&id("X"), 500).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        engine.extend(&id("X"), 400).unwrap();
    }

    #[test]
    fn test_cancel_restores_reserved_quantity_not_requested() {
        let store = Arc::new(InMemoryItemStore::with_items([widget("X", 10)]));
        let engine = engine_with(store);

        engine.reserve(&id("X"), 4, 60_000).unwrap();
        let snapshot = engine.cancel(&id("X"), 9).unwrap();
        assert_eq!(snapshot.quantity_available, 10);
        assert_eq!(engine.pending_expirations(), 0);
    }

    #[test]
    fn test_reserve_after_shutdown() {
        let store = Arc::new(InMemoryItemStore::with_items([widget("X", 10)]));
        let engine = engine_with(store.clone());
        engine.shutdown();

        let err = engine.reserve(&id("X"), 1, 1_000).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ShuttingDown);
        assert!(!store.get_item(&id("X")).unwrap().unwrap().is_reserved());
    }

    /// Store whose conditional writes fail a fixed number of times.
    struct FlakyStore {
        inner: InMemoryItemStore,
        failures_left: Mutex<u32>,
    }

    impl ItemStore for FlakyStore {
        fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
            self.inner.get_item(id)
        }
        fn list_items(&self) -> Result<Vec<Item>> {
            self.inner.list_items()
        }
        fn reserved_items(&self) -> Result<Vec<Item>> {
            self.inner.reserved_items()
        }
        fn insert_item(&self, item: &Item) -> Result<()> {
            self.inner.insert_item(item)
        }
        fn set_quantity(&self, id: &ItemId, quantity: u32) -> Result<bool> {
            self.inner.set_quantity(id, quantity)
        }
        fn set_reservation(
            &self,
            id: &ItemId,
            reservation: Option<ReservationRecord>,
        ) -> Result<bool> {
            self.inner.set_reservation(id, reservation)
        }
        fn update_stock(
            &self,
            id: &ItemId,
            expected_reserved: bool,
            update: &StockUpdate,
        ) -> Result<bool> {
            // Only releases are flaky.
            if expected_reserved {
                let mut left = self.failures_left.lock().unwrap();
                if *left > 0 {
                    *left -= 1;
                    return Err(Error::store("transient failure"));
                }
            }
            self.inner.update_stock(id, expected_reserved, update)
        }
    }

    fn flaky_engine(failures: u32) -> (ReservationEngine, Arc<FlakyStore>, Arc<RecordingSink>) {
        let policy = RetryPolicy::default()
            .with_initial_backoff(Duration::from_millis(5))
            .with_max_backoff(Duration::from_millis(20));
        flaky_engine_with(failures, policy)
    }

    fn flaky_engine_with(
        failures: u32,
        policy: RetryPolicy,
    ) -> (ReservationEngine, Arc<FlakyStore>, Arc<RecordingSink>) {
        let store = Arc::new(FlakyStore {
            inner: InMemoryItemStore::with_items([widget("X", 10), widget("Y", 5)]),
            failures_left: Mutex::new(failures),
        });
        let sink = Arc::new(RecordingSink::default());
        let engine = ReservationEngine::builder(store.clone(), Arc::new(Scheduler::new()))
            .options(
                EngineOptions::default()
                    .with_recover_on_start(false)
                    .with_expiry_retry(policy),
            )
            .failure_sink(sink.clone())
            .build()
            .unwrap();
        (engine, store, sink)
    }

    #[test]
    fn test_expiration_retries_transient_failures() {
        let (engine, store, sink) = flaky_engine(2);
        engine.reserve(&id("X"), 4, 1).unwrap();

        wait_until(|| !store.get_item(&id("X")).unwrap().unwrap().is_reserved());
        assert_eq!(store.get_item(&id("X")).unwrap().unwrap().quantity_available(), 10);
        assert!(sink.failures.lock().unwrap().is_empty());
    }

    #[test]
    fn test_expiration_reports_exhausted_retries() {
        let (engine, store, sink) = flaky_engine(3);
        engine.reserve(&id("X"), 4, 1).unwrap();

        wait_until(|| !sink.failures.lock().unwrap().is_empty());
        assert_eq!(*sink.failures.lock().unwrap(), vec![("X".to_string(), 3)]);

        let item = store.get_item(&id("X")).unwrap().unwrap();
        assert!(item.is_reserved());
        assert_eq!(item.quantity_available(), 6);
        assert_eq!(engine.pending_expirations(), 0);

        // The stranded reservation can still be cancelled.
        let snapshot = engine.cancel(&id("X"), 4).unwrap();
        assert_eq!(snapshot.quantity_available, 10);
    }

    /// A backing-off expiry holds neither the item nor the scheduler.
    #[test]
    fn test_expiry_backoff_does_not_block_other_work() {
        let policy = RetryPolicy::default()
            .with_initial_backoff(Duration::from_millis(800))
            .with_max_backoff(Duration::from_millis(800));
        let (engine, store, sink) = flaky_engine_with(1, policy);
        engine.reserve(&id("X"), 4, 1).unwrap();

        // The first release attempt failed and a retry is pending.
        wait_until(|| *store.failures_left.lock().unwrap() == 0);

        let started = Instant::now();
        engine.reserve(&id("Y"), 2, 1).unwrap();
        wait_until(|| !store.get_item(&id("Y")).unwrap().unwrap().is_reserved());
        assert!(started.elapsed() < Duration::from_millis(400));

        let started = Instant::now();
        let snapshot = engine.cancel(&id("X"), 4).unwrap();
        assert!(started.elapsed() < Duration::from_millis(400));
        assert_eq!(snapshot.quantity_available, 10);

        // Cancel disarmed the retry.
        assert_eq!(engine.pending_expirations(), 0);
        thread::sleep(Duration::from_millis(900));
        assert!(sink.failures.lock().unwrap().is_empty());
        assert_eq!(store.get_item(&id("X")).unwrap().unwrap().quantity_available(), 10);
    }
}
