// src/cli/mod.rs
//! Command-line interface definitions

/// Clap argument structures for every subcommand
pub mod commands;

pub use commands::{Action, BenchmarkOptions, Commands, ConfigOptions, StartOptions};
