//! Cancel command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, parse_item_id, GlobalOptions};
use clap::Args;

/// End a reservation early and return its stock.
#[derive(Args)]
pub struct CancelCommand {
    /// Item identifier
    #[arg(value_name = "ID")]
    pub id: String,

    /// Quantity the caller believes is reserved
    ///
    /// The quantity recorded at reservation time is always the one returned;
    /// a different value is reported and ignored.
    #[arg(long, value_name = "QTY")]
    pub quantity: u32,
}

impl CancelCommand {
    /// Execute the cancel command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let id = parse_item_id(&self.id)?;
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config, true)?;

        let snapshot = engine
            .cancel(&id, self.quantity)
            .map_err(CliError::from)?;

        if !global.quiet {
            println!(
                "Cancelled reservation of {} ({} available)",
                snapshot.id, snapshot.quantity_available
            );
        }

        Ok(())
    }
}
