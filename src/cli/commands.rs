// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DERO Miner CLI - concurrent getwork miner in Rust
#[derive(Parser, Debug)]
#[command(name = "dero-miner-rs")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (start mining, run benchmarks, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Start mining against a getwork endpoint
    Start(StartOptions),

    /// Measure raw hashing speed
    Bench(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for starting the mining operation
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Payout address (overrides config)
    #[arg(short, long)]
    pub wallet: Option<String>,

    /// Getwork endpoint as host:port (overrides config)
    #[arg(short, long)]
    pub daemon: Option<String>,

    /// Number of worker threads to use (overrides config)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Accept invalid TLS certificates (overrides config)
    #[arg(long)]
    pub insecure: bool,
}

/// Options for running the hashing benchmark
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Hashes computed by each thread
    #[arg(short, long, default_value_t = 100_000)]
    pub iterations: u64,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
