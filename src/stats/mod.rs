//! Statistics collection and reporting module
//!
//! This module turns the session's raw counters into displayable figures:
//! - Local hash rate sampled once per interval
//! - Network hash rate, height and accepted block counts from the job feed
//! - Periodic log summaries including CPU usage
//!
//! The main component is [`StatsReporter`], which publishes a [`MiningStats`]
//! snapshot any observer can read without touching mining state.

/// Submodule containing the statistics reporter implementation
pub mod reporter;

// Re-export main components
pub use reporter::{MiningStats, RateSampler, StatsReporter, format_hashrate};
