//! Configuration merging and precedence handling.
//!
//! This module implements hierarchical merging of configuration sources.
//! Nested sections are merged field by field, so a file that only sets
//! `reservation.expiry_retry.max_attempts` keeps the other retry defaults.

use crate::config::loader::ConfigSource;
use crate::config::schema::{Config, ReservationConfig, RetryConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use stockpile::config::{Config, ConfigMerger};
///
/// let low = Config { recover_on_start: Some(true), ..Default::default() };
/// let high = Config { recover_on_start: Some(false), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.recover_on_start, Some(false));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources are sorted by precedence and applied from lowest to highest.
    #[must_use]
    pub fn merge(mut sources: Vec<ConfigSource>) -> Config {
        sources.sort_by_key(|s| s.precedence);

        let mut result = Config::default();
        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }
        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - Nested sections: field-by-field merge
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.recover_on_start.is_some() {
            target.recover_on_start = source.recover_on_start;
        }

        if source.disable_autoinit.is_some() {
            target.disable_autoinit = source.disable_autoinit;
        }

        if source.maximum_lock_wait_seconds.is_some() {
            target.maximum_lock_wait_seconds = source.maximum_lock_wait_seconds;
        }

        if source.output_format.is_some() {
            target.output_format = source.output_format;
        }

        if let Some(ref source_reservation) = source.reservation {
            target.reservation = Some(match &target.reservation {
                Some(target_reservation) => {
                    Self::merge_reservation(target_reservation, source_reservation)
                }
                None => source_reservation.clone(),
            });
        }
    }

    fn merge_reservation(target: &ReservationConfig, source: &ReservationConfig) -> ReservationConfig {
        let expiry_retry = match (&target.expiry_retry, &source.expiry_retry) {
            (Some(t), Some(s)) => Some(Self::merge_retry(t, s)),
            (t, None) => t.clone(),
            (None, s) => s.clone(),
        };

        ReservationConfig {
            max_duration_ms: source.max_duration_ms.or(target.max_duration_ms),
            expiry_retry,
        }
    }

    fn merge_retry(target: &RetryConfig, source: &RetryConfig) -> RetryConfig {
        RetryConfig {
            max_attempts: source.max_attempts.or(target.max_attempts),
            initial_backoff_ms: source.initial_backoff_ms.or(target.initial_backoff_ms),
            max_backoff_ms: source.max_backoff_ms.or(target.max_backoff_ms),
        }
    }
}
