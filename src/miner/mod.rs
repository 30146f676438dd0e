// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the search itself:
//! - Versioned job store shared with the feed
//! - Work buffer layout and difficulty comparison
//! - Hash function seam
//! - Worker threads and the pool that runs them

/// CPU affinity helpers
pub mod affinity;

/// Digest acceptance against decimal difficulties
pub mod difficulty;

/// Hash function interface and reference hasher
pub mod hasher;

/// Job templates and the versioned job store
pub mod job;

/// Worker pool and the solution submission seam
///
/// Spawns search threads and defines the [`SolutionSink`] they report to.
pub mod scheduler;

/// Per-worker 48-byte work buffer
pub mod work;

/// Worker thread implementation
///
/// Contains the search loop that hashes work buffers and detects stale jobs.
pub mod worker;

// Re-export main components for cleaner imports
pub use self::difficulty::{Difficulty, check_pow};
pub use self::hasher::{Blake2Hasher, PowHasher};
pub use self::job::{JobSnapshot, JobStore, JobTemplate};
pub use self::scheduler::{Scheduler, Solution, SolutionSink};
pub use self::work::WorkBuffer;
pub use self::worker::{Worker, WorkerSettings};
