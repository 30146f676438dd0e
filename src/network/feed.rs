// src/network/feed.rs

//! Job feed client
//!
//! Keeps a websocket open to the job source, installs every job message into
//! the [`JobStore`] and owns the write half used for solution submissions.
//! Connection failures are retried after a fixed delay for as long as the
//! session stays active.
use crate::miner::job::{JobStore, JobTemplate};
use crate::miner::scheduler::{Solution, SolutionSink};
use crate::network::protocol::{JobMessage, SubmitMessage};
use crate::session::MiningSession;
use crate::types::FeedState;
use crate::utils::error::MinerError;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::time;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tungstenite::protocol::Message;
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the job feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Full websocket URL, including the `/ws/<address>` path
    pub url: Url,
    /// Skip TLS certificate and hostname checks (self-signed daemons)
    pub accept_invalid_certs: bool,
    /// Pause between a lost connection and the next attempt
    pub reconnect_delay: Duration,
    /// Upper bound on TCP connect plus websocket handshake
    pub connect_timeout: Duration,
}

/// Client for the job source
pub struct JobFeed {
    config: FeedConfig,
    store: Arc<JobStore>,
    session: Arc<MiningSession>,
    /// Write half of the live connection, `None` while disconnected
    writer: Arc<Mutex<Option<WsSink>>>,
    state: AtomicU8,
}

impl JobFeed {
    /// Creates a disconnected feed
    pub fn new(config: FeedConfig, store: Arc<JobStore>, session: Arc<MiningSession>) -> Self {
        JobFeed {
            config,
            store,
            session,
            writer: Arc::new(Mutex::new(None)),
            state: AtomicU8::new(FeedState::Disconnected.as_u8()),
        }
    }

    /// Current connection state
    pub fn state(&self) -> FeedState {
        FeedState::from_u8(self.state.load(Ordering::Relaxed))
    }

    fn set_state(&self, state: FeedState) {
        self.state.store(state.as_u8(), Ordering::Relaxed);
    }

    /// Returns a sink that workers use to submit solutions
    ///
    /// # Arguments
    /// * `runtime` - Handle of the runtime driving this feed; submissions block on it
    pub fn submitter(&self, runtime: Handle) -> Submitter {
        Submitter {
            writer: self.writer.clone(),
            runtime,
            write_timeout: SUBMIT_TIMEOUT,
        }
    }

    /// Connect/read/backoff loop; returns once the session is deactivated
    pub async fn run(&self) {
        let url = &self.config.url;
        while self.session.is_active() {
            self.set_state(FeedState::Connecting);
            log::info!("Connecting to {}", url);

            let outcome = tokio::select! {
                connected = self.connect() => match connected {
                    Ok(source) => {
                        self.set_state(FeedState::Subscribed);
                        log::info!("Subscribed to {}", url);
                        self.read_jobs(source).await
                    }
                    Err(e) => Err(e),
                },
                _ = self.session.stopped() => Ok(()),
            };

            self.disconnect().await;
            self.set_state(FeedState::Disconnected);
            if !self.session.is_active() {
                break;
            }

            if let Err(e) = outcome {
                log::warn!(
                    "Job source {} unavailable ({}), will try again in {:?}",
                    url,
                    e,
                    self.config.reconnect_delay
                );
            }
            tokio::select! {
                _ = time::sleep(self.config.reconnect_delay) => {}
                _ = self.session.stopped() => break,
            }
        }
        log::info!("Job feed stopped");
    }

    /// Establishes the websocket and stores its write half
    ///
    /// # Errors
    /// Returns `MinerError` if:
    /// - The TLS connector cannot be built
    /// - Connect and handshake exceed `connect_timeout`
    /// - DNS resolution fails
    /// - The websocket handshake fails
    async fn connect(&self) -> Result<WsSource, MinerError> {
        let url = &self.config.url;
        let connector = if self.config.accept_invalid_certs && url.scheme() == "wss" {
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()?;
            Some(Connector::NativeTls(tls))
        } else {
            None
        };

        let handshake =
            tokio_tungstenite::connect_async_tls_with_config(url.as_str(), None, true, connector);
        let Ok(connected) = time::timeout(self.config.connect_timeout, handshake).await else {
            return Err(MinerError::ConnectionError(format!(
                "handshake with {} timed out after {:?}",
                url, self.config.connect_timeout
            )));
        };

        let stream = match connected {
            Ok((stream, _)) => stream,
            Err(e) if e.to_string().contains("dns error") => {
                return Err(MinerError::ConnectionError(format!(
                    "DNS resolution failed. Check daemon address: {}",
                    url
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let (sink, source) = stream.split();
        *self.writer.lock().await = Some(sink);
        Ok(source)
    }

    /// Reads job messages until the stream fails or the session stops
    async fn read_jobs(&self, mut source: WsSource) -> Result<(), MinerError> {
        loop {
            let next = tokio::select! {
                msg = source.next() => msg,
                _ = self.session.stopped() => return Ok(()),
            };

            match next {
                Some(Ok(Message::Text(text))) => self.handle_job(text.as_str()),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => self.handle_job(text),
                    Err(_) => log::error!("Ignoring binary frame that is not UTF-8"),
                },
                Some(Ok(Message::Close(frame))) => {
                    return Err(MinerError::ConnectionError(format!(
                        "closed by job source: {:?}",
                        frame
                    )));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(MinerError::ConnectionError("stream ended".into())),
            }
        }
    }

    /// Installs one inbound job; malformed payloads are logged and skipped
    fn handle_job(&self, text: &str) {
        let msg = match JobMessage::parse(text) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Ignoring malformed job message: {}", e);
                return;
            }
        };

        self.session.update_network(&msg);
        if !msg.last_error.is_empty() {
            log::error!("Job source reported an error: {}", msg.last_error);
        }

        let template = JobTemplate::from(msg);
        let (job_id, height) = (template.job_id.clone(), template.height);
        let version = self.store.put(template);
        log::debug!("Job {} at height {} installed as version {}", job_id, height, version);
    }

    /// Drops the write half, sending a close frame when possible
    async fn disconnect(&self) {
        let sink = self.writer.lock().await.take();
        if let Some(mut sink) = sink {
            let _ = time::timeout(CLOSE_TIMEOUT, sink.close()).await;
        }
    }
}

/// Solution submission path over the feed's connection
///
/// Writes are serialized by the connection lock, so concurrent workers never
/// interleave frames. A submission made while disconnected fails and is not
/// replayed after reconnecting.
#[derive(Clone)]
pub struct Submitter {
    writer: Arc<Mutex<Option<WsSink>>>,
    runtime: Handle,
    write_timeout: Duration,
}

impl Submitter {
    /// Overrides how long a single submission may wait on a stalled peer
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Sends one solution
    ///
    /// # Errors
    /// Returns `MinerError` if:
    /// - Not connected to the job source
    /// - The websocket write fails or exceeds the write timeout
    pub async fn send(&self, solution: &Solution) -> Result<(), MinerError> {
        let payload = SubmitMessage {
            job_id: solution.job_id.clone(),
            blob: solution.blob.clone(),
        }
        .to_json()?;

        let mut conn = self.writer.lock().await;
        let ws = conn
            .as_mut()
            .ok_or(MinerError::ConnectionError("Not connected".into()))?;
        match time::timeout(self.write_timeout, ws.send(Message::Text(payload.into()))).await {
            Ok(sent) => Ok(sent?),
            Err(_) => Err(MinerError::ConnectionError(format!(
                "submission write stalled for {:?}",
                self.write_timeout
            ))),
        }
    }
}

impl SolutionSink for Submitter {
    /// Blocks the calling worker thread until the frame is written
    fn submit(&self, solution: &Solution) -> Result<(), MinerError> {
        self.runtime.block_on(self.send(solution))
    }
}
