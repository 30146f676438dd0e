// src/utils/error.rs
use serde_json;
use std::io;
use thiserror::Error;
use tokio_tungstenite::tungstenite;
use url;

/// Main error type for the mining engine
///
/// Covers every failure the engine can observe: transport problems with the
/// job source, malformed job payloads, difficulty parsing and configuration.
/// None of these is fatal to a running session; callers decide whether to
/// retry, skip the round or drop a solution.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Errors related to network connectivity
    #[error("Network connection error: {0}")]
    ConnectionError(String),

    /// Errors in protocol handling or invalid protocol messages
    #[error("Protocol violation: {0}")]
    ProtocolError(String),

    /// Job blob that cannot be turned into a work buffer
    #[error("Invalid work: {0}")]
    InvalidWork(String),

    /// Difficulty string that is not a positive decimal integer
    #[error("Invalid difficulty: {0}")]
    DifficultyError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// WebSocket communication errors
    #[error("WebSocket error: {0}")]
    WsError(#[from] tungstenite::Error),

    /// TLS connector construction errors
    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid user input or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Async task or thread execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

/// Converts hex decoding errors into MinerError
///
/// Used when invalid hex data is encountered in job blobs.
/// Wraps the original error in an `InputError` variant.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}
