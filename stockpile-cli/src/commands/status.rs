//! Status command implementation.

use crate::commands::list::{write_snapshots, FormatArg};
use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, output_format, parse_item_id, GlobalOptions};
use clap::Args;

/// Show one item and its reservation.
#[derive(Args)]
pub struct StatusCommand {
    /// Item identifier
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output format
    #[arg(long, value_enum, env = "STOCKPILE_OUTPUT_FORMAT", ignore_case = true)]
    pub format: Option<FormatArg>,
}

impl StatusCommand {
    /// Execute the status command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let id = parse_item_id(&self.id)?;
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config, false)?;

        let snapshot = engine.status(&id).map_err(CliError::from)?;
        let format = output_format(self.format.map(Into::into), &config);
        write_snapshots(&[snapshot], format)
    }
}
