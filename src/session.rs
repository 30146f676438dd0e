// src/session.rs
//! Mining session state
//!
//! A [`MiningSession`] is shared by reference between the job feed, the
//! worker pool and the telemetry reporter. It carries the cooperative
//! active flag, the global attempt counter and mirrors of the counters the
//! job source reports with every job.

use crate::network::protocol::JobMessage;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

/// Network-reported counters from the most recent job message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// Chain height of the current job
    pub height: u64,
    /// Network difficulty as an integer, also used as the network hash rate
    pub difficulty: u64,
    /// Blocks accepted for this miner
    pub blocks: u64,
    /// Mini-blocks accepted for this miner
    pub mini_blocks: u64,
    /// Submissions rejected by the job source
    pub rejected: u64,
}

/// Process-wide state for one mining activation
pub struct MiningSession {
    active: AtomicBool,
    shutdown: Notify,
    attempts: AtomicU64,
    height: AtomicU64,
    difficulty: AtomicU64,
    blocks: AtomicU64,
    mini_blocks: AtomicU64,
    rejected: AtomicU64,
}

impl MiningSession {
    /// Creates an inactive session
    pub fn new() -> Self {
        MiningSession {
            active: AtomicBool::new(false),
            shutdown: Notify::new(),
            attempts: AtomicU64::new(0),
            height: AtomicU64::new(0),
            difficulty: AtomicU64::new(0),
            blocks: AtomicU64::new(0),
            mini_blocks: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Starts a new activation, resetting the attempt counter
    pub fn activate(&self) {
        self.attempts.store(0, Ordering::Relaxed);
        self.active.store(true, Ordering::SeqCst);
    }

    /// Clears the active flag and wakes every task waiting in [`stopped`](Self::stopped)
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }

    /// Whether mining loops should keep running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Resolves once the session is no longer active
    pub async fn stopped(&self) {
        loop {
            // Register before checking the flag so a concurrent deactivate is not missed.
            let notified = self.shutdown.notified();
            if !self.is_active() {
                return;
            }
            notified.await;
        }
    }

    /// Counts one hash attempt
    #[inline]
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Total hash attempts in this activation
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Mirrors the network counters carried by a job message
    pub fn update_network(&self, msg: &JobMessage) {
        self.height.store(msg.height, Ordering::Relaxed);
        self.difficulty.store(msg.difficulty_u64, Ordering::Relaxed);
        self.blocks.store(msg.blocks, Ordering::Relaxed);
        self.mini_blocks.store(msg.mini_blocks, Ordering::Relaxed);
        self.rejected.store(msg.rejected, Ordering::Relaxed);
    }

    /// Snapshot of the network mirrors
    pub fn network(&self) -> NetworkStats {
        NetworkStats {
            height: self.height.load(Ordering::Relaxed),
            difficulty: self.difficulty.load(Ordering::Relaxed),
            blocks: self.blocks.load(Ordering::Relaxed),
            mini_blocks: self.mini_blocks.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl Default for MiningSession {
    fn default() -> Self {
        Self::new()
    }
}
