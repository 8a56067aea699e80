//! Init command implementation.
//!
//! This module implements the `init` command for explicitly creating the
//! stockpile data directory and database.

use crate::error::CliError;
use crate::utils::{shorten_path, GlobalOptions};
use clap::Args;
use std::path::PathBuf;
use stockpile::config::CONFIG_FILE_NAME;
use stockpile::database::{default_data_dir, init_data_dir, InitOptions, DATABASE_FILE_NAME};

/// Initialize the stockpile data directory and database.
#[derive(Args)]
pub struct InitCommand {
    /// Data directory to initialize
    #[arg(long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Replace an existing database
    #[arg(long)]
    pub overwrite: bool,

    /// Write a commented default configuration file
    #[arg(long)]
    pub with_config: bool,

    /// Preview actions without executing
    #[arg(long)]
    pub dry_run: bool,
}

impl InitCommand {
    /// Execute the init command.
    ///
    /// `--disable-autoinit` has no effect here; this command is the explicit
    /// initialization path.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // Priority: command flag > global flag > default
        let data_dir = match self.dir.or_else(|| global.data_dir.clone()) {
            Some(dir) => dir,
            None => default_data_dir().map_err(|_| {
                CliError::Config(
                    "Could not determine data directory (home directory not found)".to_string(),
                )
            })?,
        };

        if self.dry_run {
            print_plan(&data_dir, self.overwrite, self.with_config);
            return Ok(());
        }

        let options = InitOptions::new(data_dir)
            .with_overwrite(self.overwrite)
            .with_create_config(self.with_config);
        let result = init_data_dir(&options)?;

        if global.quiet {
            return Ok(());
        }

        println!("Initialized stockpile in: {}", shorten_path(&result.data_dir));
        if result.data_dir_created {
            println!("  - Created data directory");
        }
        if result.database_created {
            if self.overwrite {
                println!("  - Recreated database");
            } else {
                println!("  - Created database");
            }
        }
        if result.config_created {
            println!("  - Created default configuration file");
        } else if self.with_config {
            println!("  - Configuration file already exists (not overwritten)");
        }

        Ok(())
    }
}

fn print_plan(data_dir: &std::path::Path, overwrite: bool, with_config: bool) {
    println!("Dry-run mode: no changes will be made");
    println!();
    println!("Would initialize stockpile in: {}", data_dir.display());

    if data_dir.exists() {
        println!("  - Data directory already exists");
    } else {
        println!("  - Create data directory");
    }

    let db_path = data_dir.join(DATABASE_FILE_NAME);
    if !db_path.exists() {
        println!("  - Create database: {}", db_path.display());
    } else if overwrite {
        println!("  - Replace existing database: {}", db_path.display());
    } else {
        println!(
            "  - ERROR: Database already exists (use --overwrite to replace): {}",
            db_path.display()
        );
    }

    if with_config {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            println!("  - Configuration file already exists (will not overwrite)");
        } else {
            println!("  - Create configuration file: {}", config_path.display());
        }
    }
}
