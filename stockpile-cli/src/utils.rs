//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading, store and engine setup, and output
//! formatting.

use crate::error::CliError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stockpile::config::OutputFormat;
use stockpile::database::{default_data_dir, DATABASE_FILE_NAME};
use stockpile::{
    Config, ConfigBuilder, DatabaseConfig, EngineOptions, ItemId, ReservationEngine, Scheduler,
    SqliteItemStore,
};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Fields used via pattern matching in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds).
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization.
    pub disable_autoinit: bool,
}

/// Resolve the data directory from global options.
///
/// Priority: `--data-dir` / `STOCKPILE_DATA_DIR` > `~/.stockpile`.
pub fn resolve_data_dir(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    match global.data_dir {
        Some(ref dir) => Ok(dir.clone()),
        None => default_data_dir().map_err(|_| {
            CliError::Config(
                "Could not determine data directory (home directory not found)".to_string(),
            )
        }),
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Environment variables (highest priority)
/// 2. `config.yaml` in the data directory
/// 3. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let builder = ConfigBuilder::new().with_data_dir(resolve_data_dir(global)?);

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Open the item store with configuration.
///
/// # Errors
///
/// Returns `NoDataDirectory` if the database doesn't exist and auto-init is disabled.
pub fn open_store(global: &GlobalOptions, config: &Config) -> Result<SqliteItemStore, CliError> {
    let db_path = resolve_data_dir(global)?.join(DATABASE_FILE_NAME);

    let autoinit_disabled = global.disable_autoinit || config.disable_autoinit == Some(true);
    if !db_path.exists() && autoinit_disabled {
        return Err(CliError::NoDataDirectory);
    }

    log::debug!("Opening item store at {}", db_path.display());
    let mut db_config = DatabaseConfig::new(db_path);

    // Set busy timeout if specified
    if let Some(timeout_seconds) = global.busy_timeout {
        db_config = db_config.with_busy_timeout(Duration::from_secs(timeout_seconds.into()));
    } else if let Some(timeout_seconds) = config.maximum_lock_wait_seconds {
        db_config = db_config.with_busy_timeout(Duration::from_secs(timeout_seconds));
    }

    SqliteItemStore::open(db_config).map_err(CliError::from)
}

/// Build a reservation engine over the item store.
///
/// With `recover` unset, persisted reservations are left untouched until a
/// command acts on them; read-only commands and `expire` use that.
pub fn open_engine(
    global: &GlobalOptions,
    config: &Config,
    recover: bool,
) -> Result<ReservationEngine, CliError> {
    let store = open_store(global, config)?;
    let mut options = EngineOptions::from_config(config);
    options.recover_on_start = options.recover_on_start && recover;

    ReservationEngine::builder(Arc::new(store), Arc::new(Scheduler::new()))
        .options(options)
        .build()
        .map_err(CliError::from)
}

/// Parse an item identifier argument.
pub fn parse_item_id(id: &str) -> Result<ItemId, CliError> {
    ItemId::new(id).map_err(CliError::from)
}

/// Pick the output format: the command flag wins over configuration.
pub fn output_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.or(config.output_format).unwrap_or(OutputFormat::Table)
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Shorten a path for display.
///
/// If the path is within the home directory, show it as ~/...
/// Otherwise, show the full path.
pub fn shorten_path(path: &Path) -> String {
    if let Some(home) = home::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn global(data_dir: Option<PathBuf>) -> GlobalOptions {
        GlobalOptions {
            verbose: false,
            quiet: false,
            data_dir,
            busy_timeout: None,
            disable_autoinit: false,
        }
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.timestamp_millis_opt(1_705_315_845_250).unwrap(); // 2024-01-15 10:50:45.250 UTC
        let formatted = format_timestamp(ts);
        assert_eq!(formatted, "2024-01-15 10:50:45.250");
    }

    #[test]
    fn test_shorten_path_outside_home() {
        let path = PathBuf::from("/usr/local/bin");
        assert_eq!(shorten_path(&path), "/usr/local/bin");
    }

    #[test]
    fn test_output_format_precedence() {
        let config = Config {
            output_format: Some(OutputFormat::Csv),
            ..Config::default()
        };
        assert_eq!(output_format(Some(OutputFormat::Json), &config), OutputFormat::Json);
        assert_eq!(output_format(None, &config), OutputFormat::Csv);
        assert_eq!(output_format(None, &Config::default()), OutputFormat::Table);
    }

    #[test]
    fn test_open_store_respects_disable_autoinit() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = global(Some(dir.path().join("data")));
        options.disable_autoinit = true;

        let err = open_store(&options, &Config::defaults()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_parse_item_id_rejects_empty() {
        assert_eq!(parse_item_id("").unwrap_err().exit_code(), 4);
        assert_eq!(parse_item_id("SKU-1").unwrap().as_str(), "SKU-1");
    }
}
