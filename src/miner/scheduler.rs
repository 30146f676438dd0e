// src/miner/scheduler.rs
//! Worker pool
//!
//! Spawns one long-running search thread per worker and coordinates them
//! through the shared [`MiningSession`] flag and [`JobStore`] version.

use crate::miner::hasher::PowHasher;
use crate::miner::job::JobStore;
use crate::miner::worker::{Worker, WorkerSettings};
use crate::session::MiningSession;
use crate::types::MAX_WORKERS;
use crate::utils::error::MinerError;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// A digest that met the job difficulty locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Job ID this solution belongs to
    pub job_id: String,
    /// Hex of the full work buffer that produced the digest
    pub blob: String,
    /// Worker that found it
    pub worker_id: u8,
    /// Nonce written into the buffer
    pub nonce: u32,
}

/// Destination for solutions found by workers
///
/// Called from worker threads; implementations serialize their own writes.
pub trait SolutionSink: Send + Sync {
    /// Sends one solution upstream
    fn submit(&self, solution: &Solution) -> Result<(), MinerError>;
}

/// Coordinates search workers
pub struct Scheduler {
    session: Arc<MiningSession>,
    store: Arc<JobStore>,
    hasher: Arc<dyn PowHasher>,
    sink: Arc<dyn SolutionSink>,
    settings: WorkerSettings,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Creates a new Scheduler instance
    pub fn new(
        session: Arc<MiningSession>,
        store: Arc<JobStore>,
        hasher: Arc<dyn PowHasher>,
        sink: Arc<dyn SolutionSink>,
        settings: WorkerSettings,
    ) -> Self {
        Scheduler {
            session,
            store,
            hasher,
            sink,
            settings,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawns `workers` search threads and returns how many were started
    ///
    /// Counts above [`MAX_WORKERS`] are clamped; zero starts one worker.
    /// Fails while a previous batch is still running, since worker ids
    /// (the nonce-space partition) must stay unique.
    pub fn start(&self, workers: usize) -> Result<usize, MinerError> {
        let mut handles = self.lock_handles()?;
        if handles.iter().any(|h| !h.is_finished()) {
            return Err(MinerError::TaskError(
                "workers already running; stop and join before starting again".into(),
            ));
        }
        for finished in handles.drain(..) {
            if finished.join().is_err() {
                log::error!("A previous worker thread panicked");
            }
        }

        let count = workers.clamp(1, MAX_WORKERS);
        if count != workers {
            log::error!(
                "Requested {} workers, running {} (supported range 1..={})",
                workers,
                count,
                MAX_WORKERS
            );
        }

        for id in 0..count {
            let worker = Worker::new(
                id as u8,
                self.session.clone(),
                self.store.clone(),
                self.hasher.clone(),
                self.sink.clone(),
                self.settings,
            );
            let handle = thread::Builder::new()
                .name(format!("miner-{}", id))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }

        log::info!(
            "Started {} workers using {}",
            count,
            self.hasher.name()
        );
        Ok(count)
    }

    /// Asks all workers to stop after their current hash
    pub fn stop(&self) {
        self.session.deactivate();
    }

    /// Waits for every spawned worker to exit
    pub fn join(&self) -> Result<(), MinerError> {
        let handles: Vec<_> = self.lock_handles()?.drain(..).collect();
        let mut panicked = 0;
        for handle in handles {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            return Err(MinerError::TaskError(format!(
                "{} worker threads panicked",
                panicked
            )));
        }
        Ok(())
    }

    fn lock_handles(&self) -> Result<std::sync::MutexGuard<'_, Vec<JoinHandle<()>>>, MinerError> {
        self.handles
            .lock()
            .map_err(|_| MinerError::TaskError("worker handle list poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::hasher::Blake2Hasher;
    use crate::miner::job::JobTemplate;
    use crate::miner::work::WORK_SIZE;
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    const MAX_DIFFICULTY: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    /// Keeps the first solutions and counts the rest
    #[derive(Default)]
    struct RecordingSink {
        kept: Mutex<Vec<Solution>>,
    }

    impl RecordingSink {
        fn solutions(&self) -> Vec<Solution> {
            self.kept.lock().unwrap().clone()
        }

        fn workers_for(&self, job_id: &str) -> HashSet<u8> {
            self.solutions()
                .iter()
                .filter(|s| s.job_id == job_id)
                .map(|s| s.worker_id)
                .collect()
        }
    }

    impl SolutionSink for RecordingSink {
        fn submit(&self, solution: &Solution) -> Result<(), MinerError> {
            let mut kept = self.kept.lock().unwrap();
            // Bounded window per (job, worker) so slow starters still show up.
            let seen = kept
                .iter()
                .filter(|s| s.job_id == solution.job_id && s.worker_id == solution.worker_id)
                .count();
            if seen < 200 {
                kept.push(solution.clone());
            }
            Ok(())
        }
    }

    fn blob(version: u8) -> String {
        let mut bytes = [0u8; WORK_SIZE];
        bytes[0] = version;
        hex::encode(bytes)
    }

    fn job(id: &str, version: u8, difficulty: &str) -> JobTemplate {
        JobTemplate {
            job_id: id.into(),
            blob: blob(version),
            difficulty: difficulty.into(),
            height: 10,
            blocks: 0,
            mini_blocks: 0,
            error: None,
        }
    }

    fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    fn pool() -> (Arc<MiningSession>, Arc<JobStore>, Arc<RecordingSink>, Scheduler) {
        let session = Arc::new(MiningSession::new());
        let store = Arc::new(JobStore::new());
        let sink = Arc::new(RecordingSink::default());
        let settings = WorkerSettings {
            retry_delay: Duration::from_millis(20),
            idle_delay: Duration::from_millis(5),
            pin_threads: false,
        };
        let scheduler = Scheduler::new(
            session.clone(),
            store.clone(),
            Arc::new(Blake2Hasher),
            sink.clone(),
            settings,
        );
        (session, store, sink, scheduler)
    }

    #[test]
    fn test_easy_job_yields_solutions_from_every_worker() {
        let (session, store, sink, scheduler) = pool();
        store.put(job("easy", 1, "1"));
        session.activate();
        assert_eq!(scheduler.start(2).unwrap(), 2);

        let found = wait_until(Duration::from_secs(5), || {
            sink.workers_for("easy") == HashSet::from([0, 1])
        });
        scheduler.stop();
        scheduler.join().unwrap();
        assert!(found, "both workers should submit");

        for s in sink.solutions() {
            let bytes = hex::decode(&s.blob).unwrap();
            assert_eq!(bytes.len(), WORK_SIZE);
            assert_eq!(bytes[WORK_SIZE - 1], s.worker_id);
            assert_eq!(bytes[WORK_SIZE - 5..WORK_SIZE - 1], s.nonce.to_be_bytes());
        }
        assert!(session.attempts() > 0);
    }

    #[test]
    fn test_workers_resync_when_job_changes() {
        let (session, store, sink, scheduler) = pool();
        store.put(job("impossible", 1, MAX_DIFFICULTY));
        session.activate();
        scheduler.start(2).unwrap();

        assert!(wait_until(Duration::from_secs(5), || session.attempts() > 100));
        assert!(sink.solutions().is_empty());

        store.put(job("fresh", 1, "1"));
        let resynced = wait_until(Duration::from_secs(5), || {
            sink.workers_for("fresh") == HashSet::from([0, 1])
        });
        scheduler.stop();
        scheduler.join().unwrap();

        assert!(resynced, "every worker should pick up the new job");
        assert!(sink.workers_for("impossible").is_empty());
    }

    #[test]
    fn test_unsupported_version_is_rejected_then_recovers() {
        let (session, store, sink, scheduler) = pool();
        store.put(job("future", 2, "1"));
        session.activate();
        scheduler.start(2).unwrap();

        thread::sleep(Duration::from_millis(150));
        assert_eq!(session.attempts(), 0, "no hashing on an unsupported template");
        assert!(sink.solutions().is_empty());

        store.put(job("current", 1, "1"));
        let recovered = wait_until(Duration::from_secs(5), || {
            sink.workers_for("current") == HashSet::from([0, 1])
        });
        scheduler.stop();
        scheduler.join().unwrap();
        assert!(recovered);
    }

    #[test]
    fn test_bad_difficulty_skips_round() {
        let (session, store, sink, scheduler) = pool();
        store.put(job("garbled", 1, "not-a-number"));
        session.activate();
        scheduler.start(1).unwrap();

        thread::sleep(Duration::from_millis(100));
        scheduler.stop();
        scheduler.join().unwrap();
        assert_eq!(session.attempts(), 0);
        assert!(sink.solutions().is_empty());
    }

    #[test]
    fn test_stop_and_restart() {
        let (session, store, _sink, scheduler) = pool();
        store.put(job("long", 1, MAX_DIFFICULTY));

        session.activate();
        scheduler.start(2).unwrap();
        assert!(wait_until(Duration::from_secs(5), || session.attempts() > 0));
        scheduler.stop();
        scheduler.join().unwrap();

        let settled = session.attempts();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(session.attempts(), settled, "no hashing after join");

        session.activate();
        scheduler.start(1).unwrap();
        assert!(wait_until(Duration::from_secs(5), || session.attempts() > settled));
        scheduler.stop();
        scheduler.join().unwrap();
    }

    #[test]
    fn test_second_start_while_running_is_rejected() {
        let (session, store, _sink, scheduler) = pool();
        store.put(job("busy", 1, MAX_DIFFICULTY));
        session.activate();
        assert_eq!(scheduler.start(2).unwrap(), 2);

        let again = scheduler.start(2);
        assert!(matches!(again, Err(MinerError::TaskError(_))));
        assert_eq!(scheduler.lock_handles().unwrap().len(), 2, "no duplicate worker ids");

        scheduler.stop();
        scheduler.join().unwrap();

        session.activate();
        assert_eq!(scheduler.start(1).unwrap(), 1);
        scheduler.stop();
        scheduler.join().unwrap();
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let (_session, _store, _sink, scheduler) = pool();
        // Inactive session: workers exit immediately.
        assert_eq!(scheduler.start(300).unwrap(), MAX_WORKERS);
        scheduler.join().unwrap();
        assert_eq!(scheduler.start(0).unwrap(), 1);
        scheduler.join().unwrap();
    }
}
