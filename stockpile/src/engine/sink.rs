//! Destination for expirations that could not be persisted.

use crate::error::Error;
use crate::item::ItemId;

/// Receives expirations that failed after every retry.
///
/// The item stays reserved with no armed timer when this is called; a later
/// cancel, recovery pass or overdue sweep can release it.
pub trait ExpiryFailureSink: Send + Sync {
    /// Reports that `item_id` could not be released after `attempts` tries.
    fn expiry_failed(&self, item_id: &ItemId, attempts: u32, error: &Error);
}

/// Default sink that reports through [`log::error!`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailureSink;

impl ExpiryFailureSink for LogFailureSink {
    fn expiry_failed(&self, item_id: &ItemId, attempts: u32, error: &Error) {
        log::error!(
            "giving up on expiring reservation for {item_id} after {attempts} attempt(s): {error}"
        );
    }
}
