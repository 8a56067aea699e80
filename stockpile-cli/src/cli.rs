//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    AddCommand, CancelCommand, ExpireCommand, ExtendCommand, InitCommand, ListCommand,
    ReserveCommand, SetQuantityCommand, StatusCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for inventory items and time-bounded stock reservations.
#[derive(Parser)]
#[command(name = "stockpile")]
#[command(version, about = "Reserve inventory stock for a limited time", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "STOCKPILE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "STOCKPILE_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization
    #[arg(long, global = true, env = "STOCKPILE_DISABLE_AUTOINIT")]
    pub disable_autoinit: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Add an item to the inventory
    Add(AddCommand),

    /// List items
    List(ListCommand),

    /// Show one item and its reservation
    Status(StatusCommand),

    /// Overwrite the available quantity of an item
    SetQuantity(SetQuantityCommand),

    /// Reserve stock of an item for a limited time
    Reserve(ReserveCommand),

    /// Lengthen an active reservation
    Extend(ExtendCommand),

    /// End a reservation early and return its stock
    Cancel(CancelCommand),

    /// Release reservations whose deadline has passed
    Expire(ExpireCommand),
}
