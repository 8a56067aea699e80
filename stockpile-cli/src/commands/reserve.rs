//! Reserve command implementation.
//!
//! This module implements the `reserve` command. The reservation is
//! persisted and outlives the process; with `--wait` the process stays up
//! and its own timer releases the stock at the deadline.

use crate::error::CliError;
use crate::utils::{format_timestamp, load_configuration, open_engine, parse_item_id, GlobalOptions};
use clap::Args;
use std::thread;
use std::time::Duration;

/// How often `--wait` checks whether the reservation is gone.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Reserve stock of an item for a limited time.
#[derive(Args)]
pub struct ReserveCommand {
    /// Item identifier
    #[arg(value_name = "ID")]
    pub id: String,

    /// Quantity to hold
    #[arg(long, value_name = "QTY")]
    pub quantity: u32,

    /// How long to hold it, in milliseconds
    #[arg(long, value_name = "MS")]
    pub duration_ms: u64,

    /// Stay running until the reservation is released
    #[arg(long)]
    pub wait: bool,
}

impl ReserveCommand {
    /// Execute the reserve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let id = parse_item_id(&self.id)?;
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config, true)?;

        let snapshot = engine
            .reserve(&id, self.quantity, self.duration_ms)
            .map_err(CliError::from)?;

        if !global.quiet {
            let expires = snapshot
                .expires_at
                .map_or_else(|| "-".to_string(), format_timestamp);
            println!(
                "Reserved {} of {} until {} ({} available)",
                snapshot.reserved_quantity, snapshot.id, expires, snapshot.quantity_available
            );
        }

        if !self.wait {
            return Ok(());
        }

        // Until released here or elsewhere, or replaced by another reservation.
        loop {
            thread::sleep(WAIT_POLL_INTERVAL);
            let current = engine.status(&id).map_err(CliError::from)?;
            if !current.reserved
                || current.reservation_started_at != snapshot.reservation_started_at
            {
                if !global.quiet {
                    println!(
                        "Released {}: {} available",
                        current.id, current.quantity_available
                    );
                }
                break;
            }
        }

        engine.shutdown();
        Ok(())
    }
}
