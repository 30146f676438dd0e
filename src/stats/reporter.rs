// src/stats/reporter.rs
use crate::session::MiningSession;
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use sysinfo::System;

/// Point-in-time view of mining performance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiningStats {
    /// Local hash rate over the last sample interval
    pub hashrate: f64,
    /// `hashrate` formatted for display, empty before the first sample
    pub hashrate_display: String,
    /// Hash attempts since the session was activated
    pub hashes_total: u64,
    /// Average hash rate since the reporter started
    pub avg_hashrate: f64,
    /// Network hash rate as reported by the job source
    pub network_hashrate_display: String,
    /// Chain height of the current job
    pub height: u64,
    /// Blocks accepted for this miner
    pub blocks: u64,
    /// Mini-blocks accepted for this miner
    pub mini_blocks: u64,
    /// Submissions rejected by the job source
    pub rejected: u64,
}

/// Formats a rate with the largest unit it exceeds
///
/// Below 1000 the value is printed as whole hashes; above that three
/// decimals of KH/s, MH/s, GH/s or TH/s.
pub fn format_hashrate(rate: f64) -> String {
    const UNITS: [(f64, &str); 4] = [
        (1e12, "TH/s"),
        (1e9, "GH/s"),
        (1e6, "MH/s"),
        (1e3, "KH/s"),
    ];
    for (scale, unit) in UNITS {
        if rate > scale {
            return format!("{:.3} {}", rate / scale, unit);
        }
    }
    format!("{:.0} H/s", rate.max(0.0))
}

/// Turns a monotonically growing counter into a per-second rate
#[derive(Debug, Clone, Copy)]
pub struct RateSampler {
    last_count: u64,
    last_time: Instant,
}

impl RateSampler {
    /// Starts sampling from `count` at `at`
    pub fn new(count: u64, at: Instant) -> Self {
        RateSampler {
            last_count: count,
            last_time: at,
        }
    }

    /// Rate since the previous sample, in units per second
    ///
    /// A counter that went backwards (session restarted) restarts the window.
    pub fn sample(&mut self, count: u64, at: Instant) -> f64 {
        let elapsed = at.saturating_duration_since(self.last_time).as_secs_f64();
        let delta = count.saturating_sub(self.last_count);
        self.last_count = count;
        self.last_time = at;
        if elapsed <= 0.0 {
            return 0.0;
        }
        delta as f64 / elapsed
    }
}

/// Samples the session counters and publishes [`MiningStats`]
///
/// Purely observational: reads the session, never writes to it.
pub struct StatsReporter {
    session: Arc<MiningSession>,
    latest: Arc<ArcSwap<MiningStats>>,
    sample_interval: Duration,
    report_interval: Duration,
}

impl StatsReporter {
    /// Creates a reporter
    ///
    /// # Arguments
    /// * `sample_interval` - How often the attempt counter is sampled
    /// * `report_interval` - How often a summary is logged
    pub fn new(
        session: Arc<MiningSession>,
        sample_interval: Duration,
        report_interval: Duration,
    ) -> Self {
        StatsReporter {
            session,
            latest: Arc::new(ArcSwap::from_pointee(MiningStats::default())),
            sample_interval,
            report_interval,
        }
    }

    /// Latest published statistics
    pub fn get_stats(&self) -> MiningStats {
        (**self.latest.load()).clone()
    }

    /// Builds stats from the session and a freshly measured rate
    fn collect(&self, hashrate: f64, avg_hashrate: f64) -> MiningStats {
        let network = self.session.network();
        MiningStats {
            hashrate,
            hashrate_display: format_hashrate(hashrate),
            hashes_total: self.session.attempts(),
            avg_hashrate,
            network_hashrate_display: format_hashrate(network.difficulty as f64),
            height: network.height,
            blocks: network.blocks,
            mini_blocks: network.mini_blocks,
            rejected: network.rejected,
        }
    }

    /// Spawns the sampling thread; it exits when the session is deactivated
    pub fn start_reporting(&self) -> std::io::Result<JoinHandle<()>> {
        let reporter = StatsReporter {
            session: self.session.clone(),
            latest: self.latest.clone(),
            sample_interval: self.sample_interval,
            report_interval: self.report_interval,
        };

        thread::Builder::new()
            .name("stats".into())
            .spawn(move || reporter.sample_loop())
    }

    fn sample_loop(&self) {
        let mut system = System::new();
        let started = Instant::now();
        let mut sampler = RateSampler::new(self.session.attempts(), started);
        let mut last_report = started;

        while self.session.is_active() {
            thread::sleep(self.sample_interval);

            let now = Instant::now();
            let hashrate = sampler.sample(self.session.attempts(), now);
            let uptime = now.duration_since(started).as_secs_f64();
            let avg = if uptime > 0.0 {
                self.session.attempts() as f64 / uptime
            } else {
                0.0
            };

            let stats = self.collect(hashrate, avg);
            log::debug!("Hashrate: {}", stats.hashrate_display);

            if now.duration_since(last_report) >= self.report_interval {
                system.refresh_cpu_all();
                let cpus = system.cpus();
                let cpu_usage = if cpus.is_empty() {
                    0.0
                } else {
                    cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
                };
                log::info!(
                    "Hashrate: {} | Network: {} | Height: {} | Blocks/Mini: {}/{} | Rejected: {} | CPU: {:.1}%",
                    stats.hashrate_display,
                    stats.network_hashrate_display,
                    stats.height,
                    stats.blocks,
                    stats.mini_blocks,
                    stats.rejected,
                    cpu_usage
                );
                last_report = now;
            }

            self.latest.store(Arc::new(stats));
        }
    }
}
