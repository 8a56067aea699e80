//! Expire command implementation.
//!
//! This module implements the `expire` command, which releases persisted
//! reservations whose deadline passed while no process was running to
//! release them.

use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, GlobalOptions};
use clap::Args;

/// Release reservations whose deadline has passed.
#[derive(Args)]
pub struct ExpireCommand {
    /// Perform a dry run
    #[arg(long)]
    pub dry_run: bool,
}

impl ExpireCommand {
    /// Execute the expire command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // Load configuration
        let config = load_configuration(global)?;

        if self.dry_run && !global.quiet {
            eprintln!("[DRY RUN] Scanning for overdue reservations...");
        }

        // Recovery would release them before we look.
        let engine = open_engine(global, &config, false)?;

        let released = engine
            .release_overdue(self.dry_run)
            .map_err(CliError::from)?;

        // Format output
        if global.quiet {
            if !released.is_empty() {
                println!("{}", released.len());
            }
        } else {
            let verb = if self.dry_run {
                "Would release"
            } else {
                "Released"
            };
            println!("{verb} {} overdue reservation(s)", released.len());

            if global.verbose {
                for item in &released {
                    eprintln!("  {} ({} available)", item.id, item.quantity_available);
                }
            }
        }

        Ok(())
    }
}
