// src/miner/worker.rs
//! Search worker
//!
//! Each worker owns a private [`WorkBuffer`], resynchronizes with the
//! [`JobStore`] whenever the job version moves, and hands every digest that
//! meets the job difficulty to the solution sink.

use crate::miner::affinity;
use crate::miner::difficulty::Difficulty;
use crate::miner::hasher::PowHasher;
use crate::miner::job::{JobStore, JobTemplate};
use crate::miner::scheduler::{Solution, SolutionSink};
use crate::miner::work::WorkBuffer;
use crate::session::MiningSession;
use crate::types::JobVersion;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Timing and placement knobs shared by all workers
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Pause after a template fails validation
    pub retry_delay: Duration,
    /// Poll interval while no template has arrived yet
    pub idle_delay: Duration,
    /// Pin each worker to a core
    pub pin_threads: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            retry_delay: Duration::from_secs(1),
            idle_delay: Duration::from_millis(100),
            pin_threads: true,
        }
    }
}

/// One search loop
pub struct Worker {
    id: u8,
    session: Arc<MiningSession>,
    store: Arc<JobStore>,
    hasher: Arc<dyn PowHasher>,
    sink: Arc<dyn SolutionSink>,
    settings: WorkerSettings,
}

impl Worker {
    /// Creates a worker; nothing runs until [`run`](Self::run)
    pub fn new(
        id: u8,
        session: Arc<MiningSession>,
        store: Arc<JobStore>,
        hasher: Arc<dyn PowHasher>,
        sink: Arc<dyn SolutionSink>,
        settings: WorkerSettings,
    ) -> Self {
        Worker {
            id,
            session,
            store,
            hasher,
            sink,
            settings,
        }
    }

    /// Runs until the session is deactivated
    pub fn run(self) {
        if self.settings.pin_threads && !affinity::pin_current_thread(self.id as usize) {
            log::debug!("Worker {} running without CPU affinity", self.id);
        }

        let mut work = WorkBuffer::with_random_salt(self.id);
        let mut nonce = 0u32;
        let mut reported: Option<JobVersion> = None;

        while self.session.is_active() {
            let snapshot = self.store.get();
            let Some(job) = snapshot.template.clone() else {
                thread::sleep(self.settings.idle_delay);
                continue;
            };

            let prepared = work
                .load_hex(&job.blob)
                .and_then(|_| job.difficulty.parse::<Difficulty>());
            let difficulty = match prepared {
                Ok(difficulty) => difficulty,
                Err(e) => {
                    // Log each bad template once per worker; retries stay quiet.
                    if reported != Some(snapshot.version) {
                        log::error!(
                            "Worker {}: job {} unusable, please check for updates: {}",
                            self.id,
                            job.job_id,
                            e
                        );
                        reported = Some(snapshot.version);
                    }
                    thread::sleep(self.settings.retry_delay);
                    continue;
                }
            };

            self.search(&mut work, &job, &difficulty, snapshot.version, &mut nonce);
        }

        log::debug!("Worker {} stopped", self.id);
    }

    /// Hashes until the job goes stale or the session stops
    fn search(
        &self,
        work: &mut WorkBuffer,
        job: &JobTemplate,
        difficulty: &Difficulty,
        version: JobVersion,
        nonce: &mut u32,
    ) {
        while self.store.version() == version && self.session.is_active() {
            *nonce = nonce.wrapping_add(1);
            work.set_nonce(*nonce);

            let digest = self.hasher.hash(work.as_bytes());
            self.session.record_attempt();

            // Local accept only; the network target may have moved meanwhile.
            if difficulty.accepts(&digest) {
                log::info!(
                    "Worker {} found a solution for job {} (height {}, difficulty {})",
                    self.id,
                    job.job_id,
                    job.height,
                    job.difficulty
                );
                let solution = Solution {
                    job_id: job.job_id.clone(),
                    blob: work.to_hex(),
                    worker_id: self.id,
                    nonce: *nonce,
                };
                if let Err(e) = self.sink.submit(&solution) {
                    log::error!("Worker {}: submission dropped: {}", self.id, e);
                }
            }
        }
    }
}
