//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the shotline binary.

mod commands;
mod shots;

pub use commands::Cli;
pub use shots::handle_command;
