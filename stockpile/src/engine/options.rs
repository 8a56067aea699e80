//! Tunables for the reservation engine.

use std::time::Duration;

use crate::config::Config;

use super::retry::RetryPolicy;

/// Options controlling engine behaviour.
///
/// # Examples
///
/// ```
/// use stockpile::{Config, EngineOptions};
///
/// let options = EngineOptions::from_config(&Config::default());
/// assert!(options.recover_on_start);
/// assert_eq!(options.expiry_retry.max_attempts, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound for a reservation's total duration, if any.
    pub max_duration_ms: Option<u64>,
    /// Backoff used when an expiration cannot be persisted.
    pub expiry_retry: RetryPolicy,
    /// Run [`recover`](crate::ReservationEngine::recover) when the engine is built.
    pub recover_on_start: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_duration_ms: None,
            expiry_retry: RetryPolicy::default(),
            recover_on_start: true,
        }
    }
}

impl EngineOptions {
    /// Derives engine options from a resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let reservation = config.reservation.as_ref();
        let retry = reservation.and_then(|r| r.expiry_retry.as_ref());
        let base = RetryPolicy::default();

        Self {
            max_duration_ms: reservation.and_then(|r| r.max_duration_ms),
            expiry_retry: RetryPolicy {
                max_attempts: retry
                    .and_then(|r| r.max_attempts)
                    .unwrap_or(base.max_attempts),
                initial_backoff: retry
                    .and_then(|r| r.initial_backoff_ms)
                    .map_or(base.initial_backoff, Duration::from_millis),
                max_backoff: retry
                    .and_then(|r| r.max_backoff_ms)
                    .map_or(base.max_backoff, Duration::from_millis),
                multiplier: base.multiplier,
            },
            recover_on_start: config.recover_on_start.unwrap_or(defaults.recover_on_start),
        }
    }

    /// Sets the maximum duration.
    #[must_use]
    pub const fn with_max_duration_ms(mut self, max: Option<u64>) -> Self {
        self.max_duration_ms = max;
        self
    }

    /// Sets the expiration retry policy.
    #[must_use]
    pub fn with_expiry_retry(mut self, policy: RetryPolicy) -> Self {
        self.expiry_retry = policy;
        self
    }

    /// Enables or disables recovery at build time.
    #[must_use]
    pub const fn with_recover_on_start(mut self, recover: bool) -> Self {
        self.recover_on_start = recover;
        self
    }
}
