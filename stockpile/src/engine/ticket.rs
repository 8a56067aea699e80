//! Engine-side bookkeeping for one item.

use chrono::{DateTime, Utc};

use super::scheduler::{Scheduler, TimerHandle};

/// In-memory record of an active reservation, keyed by item in the engine.
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub(crate) reserved_quantity: u32,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) generation: u64,
    /// `None` once the timer fired without releasing, or when arming failed.
    pub(crate) timer: Option<TimerHandle>,
    /// Failed expiry attempts for this deadline; retries are re-armed timers.
    pub(crate) failed_attempts: u32,
}

/// Per-item state guarded by the item's mutex.
///
/// `generation` survives across reservations so that a timer from an earlier
/// reservation can never match a later one.
#[derive(Debug, Default)]
pub(crate) struct ItemSlot {
    pub(crate) generation: u64,
    pub(crate) ticket: Option<Ticket>,
}

impl ItemSlot {
    /// Moves to the next generation and returns it.
    pub(crate) fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Invalidates any armed timer and drops the ticket.
    pub(crate) fn clear(&mut self, scheduler: &Scheduler) {
        self.advance();
        if let Some(ticket) = self.ticket.take() {
            if let Some(timer) = ticket.timer {
                scheduler.disarm(timer);
            }
        }
    }

    /// Whether a timer is currently responsible for releasing this item.
    pub(crate) fn is_armed(&self) -> bool {
        self.ticket.as_ref().is_some_and(|t| t.timer.is_some())
    }
}
