//! Extend command implementation.

use crate::error::CliError;
use crate::utils::{format_timestamp, load_configuration, open_engine, parse_item_id, GlobalOptions};
use clap::Args;

/// Lengthen an active reservation.
#[derive(Args)]
pub struct ExtendCommand {
    /// Item identifier
    #[arg(value_name = "ID")]
    pub id: String,

    /// Milliseconds to add to the reservation
    #[arg(long, value_name = "MS")]
    pub additional_ms: u64,
}

impl ExtendCommand {
    /// Execute the extend command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let id = parse_item_id(&self.id)?;
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config, true)?;

        let snapshot = engine
            .extend(&id, self.additional_ms)
            .map_err(CliError::from)?;

        if !global.quiet {
            let expires = snapshot
                .expires_at
                .map_or_else(|| "-".to_string(), format_timestamp);
            println!("Extended {} until {}", snapshot.id, expires);
        }

        Ok(())
    }
}
