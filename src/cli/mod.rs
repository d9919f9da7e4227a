//! Command-line interface for hubcsv.
//!
//! Provides the export, info, index, serve and search commands.

mod commands;

pub use commands::{parse_cli, run_with_cli};
