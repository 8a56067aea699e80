//! Error types for the stockpile library.
//!
//! This module provides the error hierarchy for all operations in the
//! stockpile library, using `thiserror` for ergonomic error handling.
//! Request layers should dispatch on [`Error::kind`] rather than on
//! message text.

use std::fmt;

use thiserror::Error;

/// Result type alias for operations that may fail with a stockpile error.
///
/// # Examples
///
/// ```
/// use stockpile::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(10)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the stockpile library.
#[derive(Debug, Error)]
pub enum Error {
    /// A request argument failed validation before any store access.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The item identifier does not resolve in the store.
    #[error("item not found: {item_id}")]
    NotFound {
        /// The identifier that was looked up.
        item_id: String,
    },

    /// `extend` or `cancel` was called on an item without an active reservation.
    #[error("item {item_id} has no active reservation")]
    NotReserved {
        /// The item that is not reserved.
        item_id: String,
    },

    /// `reserve` was called on an item that is already reserved.
    #[error("reservation conflict: {details}")]
    ReservationConflict {
        /// Details about the conflict.
        details: String,
    },

    /// The requested quantity exceeds what is available.
    #[error("insufficient quantity for {item_id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        /// The item being reserved.
        item_id: String,
        /// The quantity that was requested.
        requested: u32,
        /// The quantity currently available.
        available: u32,
    },

    /// An item with the same identifier already exists.
    #[error("item already exists: {item_id}")]
    AlreadyExists {
        /// The duplicated identifier.
        item_id: String,
    },

    /// The underlying item store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database was written by a different schema version.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: u32,
        /// The schema version found in the database.
        found: u32,
    },

    /// The scheduler has been shut down and no longer accepts timers.
    #[error("reservation scheduler is shut down")]
    ShuttingDown,
}

/// Coarse error classification for single-dispatch by request layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input, never retried.
    Validation,
    /// Unknown item.
    NotFound,
    /// No active reservation.
    NotReserved,
    /// Item already reserved.
    ReservationConflict,
    /// Not enough stock.
    InsufficientQuantity,
    /// Duplicate item identifier.
    AlreadyExists,
    /// Persistence failure.
    Store,
    /// Configuration problem.
    Configuration,
    /// Filesystem problem.
    Io,
    /// Engine is shutting down.
    ShuttingDown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::NotReserved => "not_reserved",
            Self::ReservationConflict => "reservation_conflict",
            Self::InsufficientQuantity => "insufficient_quantity",
            Self::AlreadyExists => "already_exists",
            Self::Store => "store",
            Self::Configuration => "configuration",
            Self::Io => "io",
            Self::ShuttingDown => "shutting_down",
        };
        f.write_str(name)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store {
            source: Box::new(err),
        }
    }
}

impl From<crate::item::ValidationError> for Error {
    fn from(err: crate::item::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Builds a store error from any error-like message.
    ///
    /// Store implementations that are not backed by `rusqlite` use this to
    /// surface their failures as the single [`ErrorKind::Store`] kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockpile::{Error, ErrorKind};
    ///
    /// let err = Error::store("connection reset");
    /// assert_eq!(err.kind(), ErrorKind::Store);
    /// ```
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Store {
            source: message.into(),
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotReserved { .. } => ErrorKind::NotReserved,
            Self::ReservationConflict { .. } => ErrorKind::ReservationConflict,
            Self::InsufficientQuantity { .. } => ErrorKind::InsufficientQuantity,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Store { .. } | Self::UnsupportedSchemaVersion { .. } => ErrorKind::Store,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
            Self::ShuttingDown => ErrorKind::ShuttingDown,
        }
    }

    /// Check if error indicates the item does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockpile::Error;
    ///
    /// let err = Error::NotFound { item_id: "widget".into() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = Error::Validation {
            field: "quantity".to_string(),
            message: "must be greater than 0".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("validation error"));
        assert!(display.contains("quantity"));
        assert!(display.contains("greater than 0"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_not_found_error() {
        let err = Error::NotFound {
            item_id: "sku-1".to_string(),
        };
        assert!(format!("{err}").contains("sku-1"));
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_insufficient_quantity_error() {
        let err = Error::InsufficientQuantity {
            item_id: "X".to_string(),
            requested: 15,
            available: 10,
        };
        let display = format!("{err}");
        assert!(display.contains("requested 15"));
        assert!(display.contains("available 10"));
        assert_eq!(err.kind(), ErrorKind::InsufficientQuantity);
    }

    #[test]
    fn test_reservation_conflict_error() {
        let err = Error::ReservationConflict {
            details: "item X is already reserved".to_string(),
        };
        assert!(format!("{err}").contains("reservation conflict"));
        assert_eq!(err.kind(), ErrorKind::ReservationConflict);
    }

    #[test]
    fn test_rusqlite_error_maps_to_store_kind() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_helper() {
        let err = Error::store("disk full");
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(format!("{err}").contains("disk full"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::NotReserved.to_string(), "not_reserved");
        assert_eq!(ErrorKind::ShuttingDown.to_string(), "shutting_down");
    }
}
