#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # stockpile
//!
//! A library for time-bounded inventory reservations.
//!
//! Callers hold a quantity of an item for a fixed duration. The reservation
//! can be extended or cancelled, and when its deadline passes the held
//! quantity is returned to stock automatically.
//!
//! ## Core Types
//!
//! - [`ReservationEngine`]: reserve, extend, cancel and status operations
//! - [`Scheduler`]: delivers expirations from a background thread
//! - [`Item`], [`ItemId`] and [`ItemSnapshot`]: inventory records
//! - [`ItemStore`]: storage seam, with [`InMemoryItemStore`] and [`SqliteItemStore`]
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use stockpile::{InMemoryItemStore, Item, ItemId, ReservationEngine, Scheduler};
//!
//! let id = ItemId::new("SKU-1").unwrap();
//! let store = Arc::new(InMemoryItemStore::with_items([
//!     Item::builder(id.clone(), "Bolt").quantity_available(10).build().unwrap(),
//! ]));
//! let engine = ReservationEngine::builder(store, Arc::new(Scheduler::new()))
//!     .build()
//!     .unwrap();
//!
//! engine.reserve(&id, 3, 30_000).unwrap();
//! let status = engine.status(&id).unwrap();
//! assert_eq!(status.quantity_available, 7);
//! assert_eq!(status.reserved_quantity, 3);
//! ```

pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod item;
pub mod logging;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig, SqliteItemStore};
pub use engine::{
    EngineBuilder, EngineOptions, ExpirationHandler, ExpiryFailureSink, LogFailureSink,
    RecoveryReport, ReservationEngine, RetryPolicy, Scheduler, TimerHandle,
};
pub use error::{Error, ErrorKind, Result};
pub use item::{
    Item, ItemBuilder, ItemId, ItemSnapshot, ReservationRecord, StockUpdate, ValidationError,
};
pub use logging::{init_logger, LogLevel, Logger};
pub use store::{InMemoryItemStore, ItemStore};
