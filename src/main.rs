// src/main.rs
use clap::Parser;
use dero_miner_rs::miner::affinity;
use dero_miner_rs::utils::init_bench_logging;
use dero_miner_rs::{self, *};
use rand::RngCore;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// Main entry point for the miner
///
/// Parses command line arguments and delegates to the subcommand handler.
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_mining(opts),
        cli::Action::Bench(opts) => run_benchmark(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Starts mining with the given options and runs until Ctrl-C
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Activates the session, statistics and worker pool
/// 4. Drives the job feed until a stop is requested
/// 5. Joins every thread before returning
fn start_mining(opts: cli::StartOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    // Apply CLI overrides
    if let Some(wallet) = opts.wallet {
        config.wallet_address = wallet;
    }
    if let Some(daemon) = opts.daemon {
        config.daemon = daemon;
    }
    if let Some(threads) = opts.threads {
        config.threads = threads;
    }
    if opts.insecure {
        config.accept_invalid_certs = true;
    }

    let feed_config = config.feed_config()?;
    let workers = config.worker_count();
    log::info!(
        "System will mine to \"{}\" with {} threads. Good luck!",
        config.wallet_address,
        workers
    );

    let rt = Runtime::new()?;
    let session = Arc::new(MiningSession::new());
    let store = Arc::new(JobStore::new());

    let feed = JobFeed::new(feed_config, store.clone(), session.clone());
    let submitter = Arc::new(feed.submitter(rt.handle().clone()));
    let scheduler = Scheduler::new(
        session.clone(),
        store,
        Arc::new(Blake2Hasher),
        submitter,
        config.worker_settings(),
    );
    let reporter = StatsReporter::new(
        session.clone(),
        Duration::from_secs(config.sample_interval_secs.max(1)),
        Duration::from_secs(config.report_interval_secs.max(1)),
    );

    session.activate();
    let stats_handle = reporter.start_reporting()?;
    scheduler.start(workers)?;

    rt.block_on(async {
        let stopper = session.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Stop requested, shutting down");
                    stopper.deactivate();
                }
                Err(e) => log::error!("Cannot listen for Ctrl-C: {}", e),
            }
        });
        feed.run().await;
    });

    scheduler.stop();
    scheduler.join()?;
    stats_handle
        .join()
        .map_err(|_| MinerError::TaskError("statistics thread panicked".into()))?;

    let stats = reporter.get_stats();
    log::info!(
        "Session finished: {} hashes, {} mini-blocks, {} blocks",
        session.attempts(),
        stats.mini_blocks,
        stats.blocks
    );
    Ok(())
}

/// Runs the hashing benchmark
///
/// Every thread pins itself, fills a 255-byte buffer with random bytes and
/// hashes it `iterations` times.
fn run_benchmark(opts: cli::BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    let threads = opts.threads.clamp(1, MAX_WORKERS);
    let iterations = opts.iterations;
    let hasher = Blake2Hasher;
    log::info!(
        "Starting {} benchmark: {} threads x {} hashes",
        hasher.name(),
        threads,
        iterations
    );

    let start_time = Instant::now();
    let total: u64 = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|id| {
                s.spawn(move || {
                    if !affinity::pin_current_thread(id) {
                        log::debug!("Thread {} running without CPU affinity", id);
                    }
                    let mut workbuf = [0u8; 255];
                    rand::rng().fill_bytes(&mut workbuf);

                    let started = Instant::now();
                    for _ in 0..iterations {
                        std::hint::black_box(hasher.hash(&workbuf));
                    }
                    log::debug!(
                        "Thread {}: {}",
                        id,
                        format_hashrate(iterations as f64 / started.elapsed().as_secs_f64())
                    );
                    iterations
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
    });

    let elapsed = start_time.elapsed().as_secs_f64();
    log::info!("Benchmark results:");
    log::info!("Total hashes: {}", total);
    log::info!("Hashrate: {}", format_hashrate(total as f64 / elapsed));
    log::logger().flush();

    Ok(())
}

/// Writes the configuration template to the requested path
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    std::fs::write(&opts.output, config::generate_template())?;
    println!("Configuration template written to {}", opts.output.display());
    Ok(())
}
