//! Build script for stockpile-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("stockpile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reserve inventory stock for a limited time")
        .long_about(
            "Command-line tool for inventory items and time-bounded stock reservations that release themselves when they lapse",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("STOCKPILE_DATA_DIR"),
        )
        .arg(
            Arg::new("busy-timeout")
                .long("busy-timeout")
                .help("Override the default busy timeout (in seconds)")
                .value_name("SECONDS")
                .global(true)
                .env("STOCKPILE_BUSY_TIMEOUT"),
        )
        .arg(
            Arg::new("disable-autoinit")
                .long("disable-autoinit")
                .help("Disable automatic database initialization")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .env("STOCKPILE_DISABLE_AUTOINIT"),
        )
        .subcommands(vec![
            Command::new("init")
                .about("Initialize the data directory and database")
                .long_about("Create the stockpile database and, optionally, a commented config.yaml"),
            Command::new("add")
                .about("Add an item to the inventory")
                .long_about("Create an item with a name, location, price and initial stock"),
            Command::new("list")
                .about("List items")
                .long_about("Display items and their reservations as a table, JSON or CSV"),
            Command::new("status")
                .about("Show one item and its reservation")
                .long_about("Display an item's stock and, if reserved, when the reservation lapses"),
            Command::new("set-quantity")
                .about("Overwrite the available quantity of an item")
                .long_about("Set the unreserved stock of an item; an active reservation is kept"),
            Command::new("reserve")
                .about("Reserve stock of an item for a limited time")
                .long_about("Take stock out of the available quantity until cancelled or expired"),
            Command::new("extend")
                .about("Lengthen an active reservation")
                .long_about("Add time to the reservation on an item, measured from its original start"),
            Command::new("cancel")
                .about("End a reservation early and return its stock")
                .long_about("Release the reservation on an item and restore the reserved quantity"),
            Command::new("expire")
                .about("Release reservations whose deadline has passed")
                .long_about("Return the stock held by every reservation that has already lapsed"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("stockpile.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
