//! # Noir Mirror CLI
//!
//! This is the binary entry point for the `noir-mirror` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting top-level errors, with their hints, and exiting non-zero.
//!
//! The mirror, sync and search logic lives in the `noir_mirror` library;
//! the binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
