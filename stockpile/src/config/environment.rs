//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `STOCKPILE_*` environment variables that
//! override configuration file values.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::env;
use std::str::FromStr;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use stockpile::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// Reads all `STOCKPILE_*` configuration variables and applies them with
    /// higher precedence than the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric duration, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(val) = env::var("STOCKPILE_MAX_DURATION_MS") {
            let max = Self::parse_number("STOCKPILE_MAX_DURATION_MS", &val)?;
            config
                .reservation
                .get_or_insert_with(Default::default)
                .max_duration_ms = Some(max);
        }

        Self::apply_retry_overrides(config)?;

        if let Ok(val) = env::var("STOCKPILE_RECOVER_ON_START") {
            config.recover_on_start = Some(Self::parse_bool("STOCKPILE_RECOVER_ON_START", &val)?);
        }

        if let Ok(val) = env::var("STOCKPILE_DISABLE_AUTOINIT") {
            config.disable_autoinit = Some(Self::parse_bool("STOCKPILE_DISABLE_AUTOINIT", &val)?);
        }

        if let Ok(val) = env::var("STOCKPILE_MAXIMUM_LOCK_WAIT_SECONDS") {
            config.maximum_lock_wait_seconds =
                Some(Self::parse_number("STOCKPILE_MAXIMUM_LOCK_WAIT_SECONDS", &val)?);
        }

        Ok(())
    }

    /// Apply expiration retry overrides.
    fn apply_retry_overrides(config: &mut Config) -> Result<()> {
        let mut retry = config
            .reservation
            .as_ref()
            .and_then(|r| r.expiry_retry.clone())
            .unwrap_or_default();
        let mut modified = false;

        if let Ok(val) = env::var("STOCKPILE_EXPIRY_RETRY_ATTEMPTS") {
            retry.max_attempts = Some(Self::parse_number("STOCKPILE_EXPIRY_RETRY_ATTEMPTS", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STOCKPILE_EXPIRY_INITIAL_BACKOFF_MS") {
            retry.initial_backoff_ms =
                Some(Self::parse_number("STOCKPILE_EXPIRY_INITIAL_BACKOFF_MS", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STOCKPILE_EXPIRY_MAX_BACKOFF_MS") {
            retry.max_backoff_ms =
                Some(Self::parse_number("STOCKPILE_EXPIRY_MAX_BACKOFF_MS", &val)?);
            modified = true;
        }

        if modified {
            config
                .reservation
                .get_or_insert_with(Default::default)
                .expiry_retry = Some(retry);
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    /// Parse a non-negative integer.
    fn parse_number<T: FromStr>(field: &str, s: &str) -> Result<T> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }
}
