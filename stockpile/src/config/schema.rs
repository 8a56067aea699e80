//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for stockpile:
//! reservation limits, the expiration retry policy, and request-layer
//! settings.

use serde::{Deserialize, Serialize};

/// Default number of attempts for persisting an expiration.
pub const DEFAULT_EXPIRY_ATTEMPTS: u32 = 3;

/// Default delay after the first failed expiration attempt.
pub const DEFAULT_EXPIRY_INITIAL_BACKOFF_MS: u64 = 100;

/// Default cap on the delay between expiration attempts.
pub const DEFAULT_EXPIRY_MAX_BACKOFF_MS: u64 = 2_000;

/// Complete configuration structure.
///
/// Every field is optional so that sources can be layered; unset fields fall
/// back to lower-precedence sources and finally to [`Config::defaults`].
///
/// # Examples
///
/// ```
/// use stockpile::config::{Config, ReservationConfig};
///
/// let config = Config {
///     reservation: Some(ReservationConfig {
///         max_duration_ms: Some(3_600_000),
///         expiry_retry: None,
///     }),
///     ..Default::default()
/// };
/// assert_eq!(config.reservation.unwrap().max_duration_ms, Some(3_600_000));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Reservation limits and expiration behaviour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationConfig>,

    /// Release or re-arm persisted reservations when the engine starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recover_on_start: Option<bool>,

    /// Disable automatic database initialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_autoinit: Option<bool>,

    /// Maximum time to wait for database lock acquisition (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_lock_wait_seconds: Option<u64>,

    /// Output format for list and status commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Built-in defaults, the lowest-precedence configuration layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockpile::config::Config;
    ///
    /// let defaults = Config::defaults();
    /// assert_eq!(defaults.recover_on_start, Some(true));
    /// ```
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            reservation: Some(ReservationConfig {
                max_duration_ms: None,
                expiry_retry: Some(RetryConfig {
                    max_attempts: Some(DEFAULT_EXPIRY_ATTEMPTS),
                    initial_backoff_ms: Some(DEFAULT_EXPIRY_INITIAL_BACKOFF_MS),
                    max_backoff_ms: Some(DEFAULT_EXPIRY_MAX_BACKOFF_MS),
                }),
            }),
            recover_on_start: Some(true),
            disable_autoinit: Some(false),
            maximum_lock_wait_seconds: Some(5),
            output_format: Some(OutputFormat::Table),
        }
    }

    /// Returns the configured maximum reservation duration, if any.
    #[must_use]
    pub fn max_duration_ms(&self) -> Option<u64> {
        self.reservation.as_ref().and_then(|r| r.max_duration_ms)
    }
}

/// Reservation limits.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReservationConfig {
    /// Upper bound on a reservation's total duration, including extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_ms: Option<u64>,

    /// Backoff applied when an expiration cannot be persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_retry: Option<RetryConfig>,
}

/// Expiration retry settings.
///
/// # Examples
///
/// ```
/// use stockpile::config::RetryConfig;
///
/// let retry: RetryConfig = serde_yaml::from_str("max_attempts: 5\n").unwrap();
/// assert_eq!(retry.max_attempts, Some(5));
/// assert_eq!(retry.max_backoff_ms, None);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Delay after the first failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_backoff_ms: Option<u64>,

    /// Cap on the exponential delay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_backoff_ms: Option<u64>,
}

/// Output format for list and status commands.
///
/// # Examples
///
/// ```
/// use stockpile::config::OutputFormat;
///
/// let format = OutputFormat::Json;
/// assert_eq!(format.to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// CSV output format.
    Csv,
    /// Human-readable table format.
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Table => write!(f, "table"),
        }
    }
}
