//! Command-line interface for cadin-lookup.
//!
//! This module provides the `lookup`, `batch` and `providers` commands.

mod commands;

pub use commands::{Cli, Commands, run_command};
