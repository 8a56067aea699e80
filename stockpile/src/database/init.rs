//! Data directory initialization.
//!
//! This module creates the stockpile data directory and database, with
//! optional creation of a commented configuration file.

use std::fs;
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;
use crate::error::{Error, Result};

use super::config::{DatabaseConfig, DATABASE_FILE_NAME};
use super::connection::Database;

/// Options for initializing a data directory.
///
/// # Examples
///
/// ```
/// use stockpile::database::InitOptions;
/// use std::path::PathBuf;
///
/// let options = InitOptions::new(PathBuf::from("/tmp/stockpile"))
///     .with_create_config(true);
/// assert!(options.create_config);
/// assert!(!options.overwrite);
/// ```
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory to initialize.
    pub data_dir: PathBuf,
    /// Replace an existing database.
    pub overwrite: bool,
    /// Write a default `config.yaml` if none exists.
    pub create_config: bool,
}

impl InitOptions {
    /// Creates options for `data_dir` with everything else off.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            overwrite: false,
            create_config: false,
        }
    }

    /// Sets whether an existing database is replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether a default configuration file is written.
    #[must_use]
    pub fn with_create_config(mut self, create_config: bool) -> Self {
        self.create_config = create_config;
        self
    }
}

/// What [`init_data_dir`] created.
#[derive(Debug)]
pub struct InitResult {
    /// The data directory did not exist before.
    pub data_dir_created: bool,
    /// A database was created (or recreated).
    pub database_created: bool,
    /// A configuration file was written.
    pub config_created: bool,
    /// The initialized directory.
    pub data_dir: PathBuf,
}

/// Contents of the configuration file written by `init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r"# stockpile configuration file
# Every setting is optional; the values shown are the defaults.

# reservation:
#   # Upper bound on a reservation's total duration, extensions included.
#   max_duration_ms: 3600000
#   # Backoff when an expiration cannot be written to the database.
#   expiry_retry:
#     max_attempts: 3
#     initial_backoff_ms: 100
#     max_backoff_ms: 2000

# Release or re-arm persisted reservations when a command starts.
# recover_on_start: true

# Maximum lock wait time in seconds.
# maximum_lock_wait_seconds: 5

# Output format for list and status: table, json or csv.
# output_format: table
";

/// Creates the data directory, database and optionally the config file.
///
/// # Errors
///
/// Returns a validation error if the database exists and `overwrite` is
/// not set, or an I/O or database error if creation fails.
pub fn init_data_dir(options: &InitOptions) -> Result<InitResult> {
    let mut result = InitResult {
        data_dir_created: false,
        database_created: false,
        config_created: false,
        data_dir: options.data_dir.clone(),
    };

    if !options.data_dir.exists() {
        fs::create_dir_all(&options.data_dir)?;
        result.data_dir_created = true;
    }

    let db_path = options.data_dir.join(DATABASE_FILE_NAME);
    let db_exists = db_path.exists();

    if db_exists && !options.overwrite {
        return Err(Error::Validation {
            field: "database".into(),
            message: format!(
                "Database already exists at {}. Use --overwrite to replace it.",
                db_path.display()
            ),
        });
    }

    if db_exists {
        fs::remove_file(&db_path)?;
        // Stale WAL files would be replayed into the new database.
        for suffix in ["-wal", "-shm"] {
            let mut side = db_path.clone().into_os_string();
            side.push(suffix);
            let side = PathBuf::from(side);
            if side.exists() {
                fs::remove_file(side)?;
            }
        }
    }

    Database::open(DatabaseConfig::new(&db_path))?;
    result.database_created = true;

    if options.create_config {
        let config_path = options.data_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
            result.config_created = true;
        }
    }

    log::info!("initialized data directory {}", options.data_dir.display());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigLoader};
    use tempfile::TempDir;

    #[test]
    fn test_init_fresh_directory() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("stockpile");

        let result = init_data_dir(&InitOptions::new(data_dir.clone())).unwrap();

        assert!(result.data_dir_created);
        assert!(result.database_created);
        assert!(!result.config_created);
        assert!(data_dir.join(DATABASE_FILE_NAME).exists());
    }

    #[test]
    fn test_init_existing_database_requires_overwrite() {
        let temp = TempDir::new().unwrap();
        let options = InitOptions::new(temp.path().to_path_buf());
        init_data_dir(&options).unwrap();

        let err = init_data_dir(&options).unwrap_err();
        assert!(format!("{err}").contains("--overwrite"));

        let result = init_data_dir(&options.with_overwrite(true)).unwrap();
        assert!(!result.data_dir_created);
        assert!(result.database_created);
    }

    #[test]
    fn test_init_with_config_never_clobbers() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "recover_on_start: false\n").unwrap();

        let options = InitOptions::new(temp.path().to_path_buf()).with_create_config(true);
        let result = init_data_dir(&options).unwrap();
        assert!(!result.config_created);
        assert_eq!(
            fs::read_to_string(&config_path).unwrap(),
            "recover_on_start: false\n"
        );
    }

    #[test]
    fn test_template_parses_as_empty_config() {
        let temp = TempDir::new().unwrap();
        let options = InitOptions::new(temp.path().to_path_buf()).with_create_config(true);
        assert!(init_data_dir(&options).unwrap().config_created);

        let config = ConfigLoader::load_file(&temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
    }
}
