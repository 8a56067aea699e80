//! Single-threaded expiration scheduler.
//!
//! The scheduler keeps a deadline-ordered queue of pending expirations and a
//! worker thread that sleeps until the earliest one is due. Disarming only
//! removes the pending entry; its stale queue slot is discarded when it
//! reaches the head.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::item::ItemId;

/// Longest delay the scheduler will wait for. Longer timers are clamped and
/// simply never fire within the life of the process.
const MAX_TIMER_DELAY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Callback invoked by the scheduler worker when a timer fires.
pub trait ExpirationHandler: Send + Sync {
    /// Called with the item and generation the timer was armed with.
    ///
    /// Runs on the scheduler worker thread with no scheduler lock held, so
    /// it may arm and disarm timers.
    fn on_expired(&self, item_id: &ItemId, generation: u64);
}

/// Opaque handle for one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Entry {
    item_id: ItemId,
    generation: u64,
}

#[derive(Debug)]
struct State {
    queue: BinaryHeap<Reverse<(Instant, u64)>>,
    pending: HashMap<u64, Entry>,
    next_id: u64,
    running: bool,
    started: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    wakeup: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Timer service that fires one callback per armed, undisarmed timer.
///
/// The scheduler is created by the caller and handed to the engine, which
/// starts its worker. Dropping the scheduler shuts it down.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use stockpile::{ItemId, Scheduler};
///
/// let scheduler = Arc::new(Scheduler::new());
/// let id = ItemId::new("X").unwrap();
///
/// let handle = scheduler.arm(&id, Duration::from_secs(60), 1).unwrap();
/// assert_eq!(scheduler.pending(), 1);
/// assert!(scheduler.disarm(handle));
/// assert!(!scheduler.disarm(handle));
///
/// scheduler.shutdown();
/// assert!(scheduler.arm(&id, Duration::from_secs(1), 2).is_err());
/// ```
#[derive(Debug)]
pub struct Scheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    thread_name: String,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates a scheduler whose worker thread is named `stockpile-expiry`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_thread_name("stockpile-expiry")
    }

    /// Creates a scheduler with a custom worker thread name.
    #[must_use]
    pub fn with_thread_name(name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    queue: BinaryHeap::new(),
                    pending: HashMap::new(),
                    next_id: 0,
                    running: true,
                    started: false,
                }),
                wakeup: Condvar::new(),
            }),
            worker: Mutex::new(None),
            thread_name: name.into(),
        }
    }

    /// Starts the worker thread that delivers expirations to `handler`.
    ///
    /// The handler is held weakly; once it is gone the worker exits.
    pub(crate) fn start(&self, handler: Weak<dyn ExpirationHandler>) -> Result<()> {
        {
            let mut state = self.shared.lock();
            if !state.running {
                return Err(Error::ShuttingDown);
            }
            if state.started {
                return Err(Error::validation(
                    "scheduler",
                    "scheduler is already attached to an engine",
                ));
            }
            state.started = true;
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_worker(&shared, &handler))?;

        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        log::debug!("expiration scheduler '{}' started", self.thread_name);
        Ok(())
    }

    /// Arms a timer that fires `(item_id, generation)` after `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has
    /// been called.
    pub fn arm(&self, item_id: &ItemId, delay: Duration, generation: u64) -> Result<TimerHandle> {
        let deadline = Instant::now() + delay.min(MAX_TIMER_DELAY);

        let mut state = self.shared.lock();
        if !state.running {
            return Err(Error::ShuttingDown);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.pending.insert(
            id,
            Entry {
                item_id: item_id.clone(),
                generation,
            },
        );
        state.queue.push(Reverse((deadline, id)));
        drop(state);

        self.shared.wakeup.notify_one();
        log::debug!("armed timer {id} for {item_id} (generation {generation}) in {delay:?}");
        Ok(TimerHandle(id))
    }

    /// Cancels a pending timer.
    ///
    /// Returns `true` if the timer was still pending. Disarming a timer that
    /// already fired or was already disarmed is a no-op.
    pub fn disarm(&self, handle: TimerHandle) -> bool {
        let removed = self.shared.lock().pending.remove(&handle.0).is_some();
        if removed {
            log::debug!("disarmed timer {}", handle.0);
        }
        removed
    }

    /// Number of timers armed and not yet fired or disarmed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Whether the scheduler still accepts timers.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Stops the scheduler, dropping every pending timer, and waits for the
    /// worker to exit.
    ///
    /// Safe to call more than once and from the worker thread itself.
    pub fn shutdown(&self) {
        let dropped = {
            let mut state = self.shared.lock();
            state.running = false;
            state.queue.clear();
            let dropped = state.pending.len();
            state.pending.clear();
            dropped
        };
        self.shared.wakeup.notify_all();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                // Joining ourselves would deadlock; the loop exits on return.
                return;
            }
            if handle.join().is_err() {
                log::error!("expiration worker '{}' panicked", self.thread_name);
            }
            log::debug!(
                "expiration scheduler '{}' stopped, {dropped} pending timer(s) dropped",
                self.thread_name
            );
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(shared: &Shared, handler: &Weak<dyn ExpirationHandler>) {
    let mut state = shared.lock();
    loop {
        if !state.running {
            return;
        }

        let Some(&Reverse((deadline, id))) = state.queue.peek() else {
            state = shared
                .wakeup
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        if !state.pending.contains_key(&id) {
            state.queue.pop();
            continue;
        }

        let now = Instant::now();
        if deadline > now {
            state = shared
                .wakeup
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }

        state.queue.pop();
        let Some(entry) = state.pending.remove(&id) else {
            continue;
        };
        drop(state);

        match handler.upgrade() {
            Some(handler) => handler.on_expired(&entry.item_id, entry.generation),
            None => return,
        }

        state = shared.lock();
    }
}
