//! Set-quantity command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, parse_item_id, GlobalOptions};
use clap::Args;

/// Overwrite the available quantity of an item.
#[derive(Args)]
pub struct SetQuantityCommand {
    /// Item identifier
    #[arg(value_name = "ID")]
    pub id: String,

    /// New available quantity
    #[arg(value_name = "QTY")]
    pub quantity: u32,
}

impl SetQuantityCommand {
    /// Execute the set-quantity command.
    ///
    /// An active reservation is kept; its quantity is still returned on
    /// release, on top of the new value.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let id = parse_item_id(&self.id)?;
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config, true)?;

        let snapshot = engine
            .set_quantity(&id, self.quantity)
            .map_err(CliError::from)?;

        if !global.quiet {
            println!("{}: {} available", snapshot.id, snapshot.quantity_available);
        }

        Ok(())
    }
}
