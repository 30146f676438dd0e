//! DERO Miner - concurrent getwork mining engine in Rust
//!
//! This crate fetches proof-of-work jobs from a remote job source over a
//! persistent websocket, searches them on a pool of worker threads and
//! submits every solution that meets the job difficulty:
//! - Versioned job store so workers never hash a stale template for long
//! - Arbitrary-precision difficulty comparison
//! - Reconnecting job feed with serialized submissions
//! - Hash rate telemetry

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Search workers, job store, work buffer and difficulty comparison
pub mod miner;

/// Job feed client and wire messages
pub mod network;

/// Per-activation shared state
pub mod session;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{
    Blake2Hasher, Difficulty, JobStore, JobTemplate, PowHasher, Scheduler, Solution,
    SolutionSink, WorkBuffer, Worker, WorkerSettings,
};
pub use network::{FeedConfig, JobFeed, Submitter};
pub use session::{MiningSession, NetworkStats};
pub use stats::{MiningStats, StatsReporter, format_hashrate};
pub use types::{FeedState, JobVersion, MAX_WORKERS};
pub use utils::{MinerError, init_logging};
