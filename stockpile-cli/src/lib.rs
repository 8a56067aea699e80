//! Library exports for stockpile-cli.
//!
//! This module exports the CLI structure so the command tree can be
//! inspected outside the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

// Re-export CLI for tooling
pub use cli::Cli;
