//! Configuration validation.
//!
//! This module checks that configuration values are in range and
//! consistent with each other.

use crate::config::schema::{Config, ReservationConfig, RetryConfig};
use crate::error::{Error, Result};

/// Upper bound on expiration attempts; each attempt holds the item's lock.
pub const MAX_EXPIRY_ATTEMPTS: u32 = 10;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use stockpile::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::defaults()).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns validation errors for invalid configurations.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref reservation) = config.reservation {
            Self::validate_reservation(reservation)?;
        }

        if let Some(timeout) = config.maximum_lock_wait_seconds {
            if timeout == 0 {
                return Err(Error::Validation {
                    field: "maximum_lock_wait_seconds".into(),
                    message: "Timeout must be greater than 0".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_reservation(reservation: &ReservationConfig) -> Result<()> {
        if reservation.max_duration_ms == Some(0) {
            return Err(Error::Validation {
                field: "reservation.max_duration_ms".into(),
                message: "Maximum duration must be greater than 0".into(),
            });
        }

        if let Some(ref retry) = reservation.expiry_retry {
            Self::validate_retry(retry)?;
        }

        Ok(())
    }

    fn validate_retry(retry: &RetryConfig) -> Result<()> {
        if let Some(attempts) = retry.max_attempts {
            if attempts == 0 || attempts > MAX_EXPIRY_ATTEMPTS {
                return Err(Error::Validation {
                    field: "reservation.expiry_retry.max_attempts".into(),
                    message: format!("Must be between 1 and {MAX_EXPIRY_ATTEMPTS}"),
                });
            }
        }

        if let (Some(initial), Some(max)) = (retry.initial_backoff_ms, retry.max_backoff_ms) {
            if initial > max {
                return Err(Error::Validation {
                    field: "reservation.expiry_retry".into(),
                    message: format!(
                        "initial_backoff_ms ({initial}) cannot exceed max_backoff_ms ({max})"
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_retry(retry: RetryConfig) -> Config {
        Config {
            reservation: Some(ReservationConfig {
                max_duration_ms: None,
                expiry_retry: Some(retry),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_empty_config() {
        ConfigValidator::validate(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_zero_lock_wait() {
        let config = Config {
            maximum_lock_wait_seconds: Some(0),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_validate_zero_max_duration() {
        let config = Config {
            reservation: Some(ReservationConfig {
                max_duration_ms: Some(0),
                expiry_retry: None,
            }),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(format!("{err}").contains("max_duration_ms"));
    }

    #[test]
    fn test_validate_attempt_bounds() {
        for attempts in [0, MAX_EXPIRY_ATTEMPTS + 1] {
            let config = with_retry(RetryConfig {
                max_attempts: Some(attempts),
                ..Default::default()
            });
            assert!(ConfigValidator::validate(&config).is_err());
        }

        let config = with_retry(RetryConfig {
            max_attempts: Some(MAX_EXPIRY_ATTEMPTS),
            ..Default::default()
        });
        ConfigValidator::validate(&config).unwrap();
    }

    #[test]
    fn test_validate_backoff_order() {
        let config = with_retry(RetryConfig {
            max_attempts: None,
            initial_backoff_ms: Some(500),
            max_backoff_ms: Some(100),
        });
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
