//! Command-line interface for klassiq.
//!
//! Provides lesson-plan generation and curriculum browsing commands.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
