//! Command line interface for appdir_bundler.
//!
//! Parses arguments, layers manifest values under flags and drives the
//! bundler with colored status output.

pub mod args;
pub mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
