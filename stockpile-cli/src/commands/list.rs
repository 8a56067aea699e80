//! List command implementation.
//!
//! This module implements the `list` command, which displays items in
//! various formats (table, JSON, CSV). The renderers are shared with
//! `status`.

use crate::error::CliError;
use crate::utils::{format_timestamp, load_configuration, open_engine, output_format, GlobalOptions};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::io::Write;
use stockpile::config::OutputFormat;
use stockpile::ItemSnapshot;

/// Column headers for table and CSV output.
const COLUMN_HEADERS: [&str; 8] = [
    "id",
    "name",
    "location",
    "price",
    "available",
    "reserved",
    "reserved_quantity",
    "expires_at",
];

/// List items.
#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, env = "STOCKPILE_OUTPUT_FORMAT", ignore_case = true)]
    pub format: Option<FormatArg>,

    /// Only show items with an active reservation
    #[arg(long)]
    pub reserved_only: bool,
}

/// Output format flag.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FormatArg {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Load configuration
        let config = load_configuration(global)?;

        // 2. Open engine without touching persisted reservations
        let engine = open_engine(global, &config, false)?;

        // 3. Query items
        let mut items = engine.list().map_err(CliError::from)?;

        // 4. Apply filters
        if self.reserved_only {
            items.retain(|item| item.reserved);
        }

        // 5. Format and output to stdout
        let format = output_format(self.format.map(Into::into), &config);
        write_snapshots(&items, format)
    }
}

/// Write snapshots to stdout in `format`.
pub fn write_snapshots(items: &[ItemSnapshot], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => format_as_table(items),
        OutputFormat::Json => format_as_json(items),
        OutputFormat::Csv => format_as_csv(items),
    }
}

fn format_expiry(item: &ItemSnapshot) -> String {
    item.expires_at.map_or_else(String::new, format_timestamp)
}

/// Format items as a human-readable table.
fn format_as_table(items: &[ItemSnapshot]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    // Print header (uppercase for table display)
    let header_line = COLUMN_HEADERS
        .iter()
        .map(|s| s.to_uppercase())
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(handle, "{header_line}")?;

    for item in items {
        let expires = format_expiry(item);
        writeln!(
            handle,
            "{}\t{}\t{}\t{:.2}\t{}\t{}\t{}\t{}",
            item.id,
            item.name,
            item.location.as_deref().unwrap_or("-"),
            item.price,
            item.quantity_available,
            if item.reserved { "yes" } else { "no" },
            item.reserved_quantity,
            if expires.is_empty() { "-" } else { &expires },
        )?;
    }

    Ok(())
}

/// Format items as JSON.
fn format_as_json(items: &[ItemSnapshot]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    serde_json::to_writer_pretty(&mut handle, items)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;

    writeln!(handle)?;

    Ok(())
}

/// One CSV record.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    name: &'a str,
    location: &'a str,
    price: f64,
    available: u32,
    reserved: bool,
    reserved_quantity: u32,
    expires_at: String,
}

/// Convert `csv::Error` to `CliError`.
fn csv_error(e: csv::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}

/// Format items as CSV.
fn format_as_csv(items: &[ItemSnapshot]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::Writer::from_writer(handle);

    for item in items {
        writer
            .serialize(CsvRow {
                id: item.id.as_str(),
                name: &item.name,
                location: item.location.as_deref().unwrap_or(""),
                price: item.price,
                available: item.quantity_available,
                reserved: item.reserved,
                reserved_quantity: item.reserved_quantity,
                expires_at: format_expiry(item),
            })
            .map_err(csv_error)?;
    }
    if items.is_empty() {
        writer.write_record(COLUMN_HEADERS).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}
