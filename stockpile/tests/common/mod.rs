//! Common test utilities for integration tests.
//!
//! This module provides helper functions and fixtures for testing the
//! stockpile library.

pub mod database;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stockpile::{
    EngineOptions, InMemoryItemStore, Item, ItemId, ItemStore, ReservationEngine, Scheduler,
};

/// Parses an item identifier, panicking on invalid input.
#[allow(dead_code)]
pub fn item_id(id: &str) -> ItemId {
    ItemId::new(id).unwrap()
}

/// Creates an unreserved item with the given quantity.
#[allow(dead_code)]
pub fn widget(id: &str, quantity: u32) -> Item {
    Item::builder(item_id(id), format!("Widget {id}"))
        .location(Some("Aisle 4".to_string()))
        .price(2.5)
        .quantity_available(quantity)
        .build()
        .unwrap()
}

/// Builds an engine over `store` with its own scheduler and no recovery.
#[allow(dead_code)]
pub fn engine_over(store: Arc<dyn ItemStore>) -> ReservationEngine {
    ReservationEngine::builder(store, Arc::new(Scheduler::new()))
        .options(EngineOptions::default().with_recover_on_start(false))
        .build()
        .unwrap()
}

/// Builds an engine over an in-memory store seeded with `items`.
///
/// The store is returned too so tests can observe persisted state directly.
#[allow(dead_code)]
pub fn memory_engine(
    items: impl IntoIterator<Item = Item>,
) -> (ReservationEngine, Arc<InMemoryItemStore>) {
    let store = Arc::new(InMemoryItemStore::with_items(items));
    (engine_over(store.clone()), store)
}

/// Reads an item straight from the store.
#[allow(dead_code)]
pub fn stored(store: &dyn ItemStore, id: &str) -> Item {
    store.get_item(&item_id(id)).unwrap().unwrap()
}

/// Polls `condition` until it holds, failing the test after `timeout`.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + timeout;
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met within {timeout:?}");
        thread::sleep(Duration::from_millis(5));
    }
}
