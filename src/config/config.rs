// src/config/config.rs
use crate::network::feed::FeedConfig;
use crate::miner::worker::WorkerSettings;
use crate::types::MAX_WORKERS;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for the miner
///
/// Contains everything needed to reach the job source and size the
/// worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Payout address, embedded in the feed URL path
    pub wallet_address: String,

    /// Job source address as `host:port`
    #[serde(default = "default_daemon")]
    pub daemon: String,

    /// Use `wss` (true) or plain `ws` (false)
    #[serde(default = "default_true")]
    pub secure: bool,

    /// Accept self-signed or otherwise unverifiable TLS certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Number of worker threads (0 = number of CPU cores)
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Pin workers to CPU cores when the platform allows it
    #[serde(default = "default_true")]
    pub pin_threads: bool,

    /// Seconds to wait before reconnecting to the job source
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,

    /// Seconds allowed for connecting and completing the websocket handshake
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Milliseconds a worker pauses after an unusable job template
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Seconds between hash rate samples
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    /// Seconds between logged summaries
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_daemon() -> String {
    "127.0.0.1:10100".into()
}

fn default_true() -> bool {
    true
}

fn default_threads() -> usize {
    num_cpus::get()
}

fn default_reconnect_delay() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    45
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_sample_interval() -> u64 {
    1
}

fn default_report_interval() -> u64 {
    60
}

impl Config {
    /// Creates a configuration with defaults for everything but the address
    pub fn new(wallet_address: impl Into<String>) -> Self {
        Config {
            wallet_address: wallet_address.into(),
            daemon: default_daemon(),
            secure: true,
            accept_invalid_certs: false,
            threads: default_threads(),
            pin_threads: true,
            reconnect_delay_secs: default_reconnect_delay(),
            connect_timeout_secs: default_connect_timeout(),
            retry_delay_ms: default_retry_delay(),
            sample_interval_secs: default_sample_interval(),
            report_interval_secs: default_report_interval(),
        }
    }

    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&config_str)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))
    }

    /// Effective worker count
    ///
    /// Zero means one worker per CPU core; anything above [`MAX_WORKERS`]
    /// is clamped rather than rejected.
    pub fn worker_count(&self) -> usize {
        let requested = if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        };
        if requested > MAX_WORKERS {
            log::error!(
                "This miner supports at most {} threads, {} requested",
                MAX_WORKERS,
                requested
            );
        } else if requested > num_cpus::get() {
            log::info!(
                "Mining threads ({}) exceed available CPUs ({}); this is not optimal",
                requested,
                num_cpus::get()
            );
        }
        requested.clamp(1, MAX_WORKERS)
    }

    /// Websocket URL of the job source: `<scheme>://<daemon>/ws/<address>`
    pub fn feed_url(&self) -> Result<Url, MinerError> {
        if self.wallet_address.trim().is_empty() {
            return Err(MinerError::ConfigError("wallet_address is empty".into()));
        }
        if self.daemon.contains("://") {
            return Err(MinerError::ConfigError(format!(
                "daemon must be host:port, got '{}'",
                self.daemon
            )));
        }
        let scheme = if self.secure { "wss" } else { "ws" };
        let mut url = Url::parse(&format!("{}://{}", scheme, self.daemon))?;
        url.set_path(&format!("/ws/{}", self.wallet_address.trim()));
        Ok(url)
    }

    /// Feed settings derived from this configuration
    pub fn feed_config(&self) -> Result<FeedConfig, MinerError> {
        Ok(FeedConfig {
            url: self.feed_url()?,
            accept_invalid_certs: self.accept_invalid_certs,
            reconnect_delay: Duration::from_secs(self.reconnect_delay_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
        })
    }

    /// Worker settings derived from this configuration
    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            pin_threads: self.pin_threads,
            ..WorkerSettings::default()
        }
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# DERO Miner Configuration\n\n");
        template.push_str("# Payout address, sent to the job source in the URL path\n");
        template.push_str("wallet_address = \"your_wallet_address\"\n");
        template.push_str("# Getwork endpoint (host:port)\n");
        template.push_str("daemon = \"127.0.0.1:10100\"\n");
        template.push_str("# Use wss:// (true) or ws:// (false)\n");
        template.push_str("secure = true\n");
        template.push_str("# Daemons serve self-signed certificates by default\n");
        template.push_str("accept_invalid_certs = true\n\n");
        template.push_str("# Number of worker threads (0 = auto-detect, max 256)\n");
        template.push_str("threads = 0\n");
        template.push_str("pin_threads = true\n\n");
        template.push_str("reconnect_delay_secs = 10\n");
        template.push_str("connect_timeout_secs = 45\n");
        template.push_str("retry_delay_ms = 1000\n");
        template.push_str("sample_interval_secs = 1\n");
        template.push_str("report_interval_secs = 60\n");
        template
    }
}
