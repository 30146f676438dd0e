// src/miner/job.rs
//! Job templates and the versioned job store
//!
//! The feed replaces the current template wholesale; workers read a
//! `(template, version)` pair that is swapped as a single immutable value,
//! so a template is never observed with another template's version.

use crate::network::protocol::JobMessage;
use crate::types::JobVersion;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Unit of mineable work issued by the job source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTemplate {
    /// Opaque job identifier, echoed back on submission
    pub job_id: String,
    /// Hex-encoded work blob
    pub blob: String,
    /// Decimal difficulty string
    pub difficulty: String,
    /// Chain height
    pub height: u64,
    /// Blocks accepted for this miner so far
    pub blocks: u64,
    /// Mini-blocks accepted for this miner so far
    pub mini_blocks: u64,
    /// Error reported alongside the template
    pub error: Option<String>,
}

impl From<JobMessage> for JobTemplate {
    fn from(msg: JobMessage) -> Self {
        JobTemplate {
            job_id: msg.job_id,
            blob: msg.blob,
            difficulty: msg.difficulty,
            height: msg.height,
            blocks: msg.blocks,
            mini_blocks: msg.mini_blocks,
            error: (!msg.last_error.is_empty()).then_some(msg.last_error),
        }
    }
}

/// Consistent view of the store at one instant
#[derive(Debug, Clone, Default)]
pub struct JobSnapshot {
    /// Current template, `None` until the first job arrives
    pub template: Option<Arc<JobTemplate>>,
    /// Version of `template`
    pub version: JobVersion,
}

/// Holds the current job template and its version
pub struct JobStore {
    current: ArcSwap<JobSnapshot>,
}

impl JobStore {
    /// Creates an empty store at version 0
    pub fn new() -> Self {
        JobStore {
            current: ArcSwap::from_pointee(JobSnapshot::default()),
        }
    }

    /// Returns the current template together with its version
    pub fn get(&self) -> Arc<JobSnapshot> {
        self.current.load_full()
    }

    /// Current version only; cheap enough for the search loop
    #[inline]
    pub fn version(&self) -> JobVersion {
        self.current.load().version
    }

    /// Installs a new template and returns its version
    pub fn put(&self, template: JobTemplate) -> JobVersion {
        let template = Arc::new(template);
        let previous = self.current.rcu(|current| JobSnapshot {
            template: Some(template.clone()),
            version: current.version + 1,
        });
        previous.version + 1
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
