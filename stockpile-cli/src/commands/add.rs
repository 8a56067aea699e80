//! Add command implementation.
//!
//! This module implements the `add` command, which creates a new item with
//! its initial stock.

use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, parse_item_id, GlobalOptions};
use clap::Args;
use stockpile::Item;

/// Add an item to the inventory.
#[derive(Args)]
pub struct AddCommand {
    /// Item identifier
    #[arg(value_name = "ID")]
    pub id: String,

    /// Human-readable name
    #[arg(long)]
    pub name: String,

    /// Initial available quantity
    #[arg(long, value_name = "QTY", default_value_t = 0)]
    pub quantity: u32,

    /// Storage location
    #[arg(long)]
    pub location: Option<String>,

    /// Unit price
    #[arg(long, default_value_t = 0.0)]
    pub price: f64,
}

impl AddCommand {
    /// Execute the add command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let id = parse_item_id(&self.id)?;
        let item = Item::builder(id, self.name)
            .location(self.location)
            .price(self.price)
            .quantity_available(self.quantity)
            .build()?;

        let config = load_configuration(global)?;
        let engine = open_engine(global, &config, true)?;
        let snapshot = engine.add_item(&item).map_err(CliError::from)?;

        if !global.quiet {
            println!(
                "Added {} ({}) with {} available",
                snapshot.id, snapshot.name, snapshot.quantity_available
            );
        }

        Ok(())
    }
}
