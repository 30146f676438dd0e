// src/network/protocol.rs
//! Getwork wire messages
//!
//! The job source pushes one JSON object per websocket frame describing the
//! current template; the miner answers with a JSON submission per solution.

use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};

/// Inbound job message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobMessage {
    /// Opaque job identifier, echoed back on submission
    #[serde(rename = "jobid")]
    pub job_id: String,
    /// Hex-encoded work blob
    #[serde(rename = "blockhashing_blob")]
    pub blob: String,
    /// Decimal difficulty, arbitrary precision
    pub difficulty: String,
    /// Integer mirror of the difficulty
    #[serde(rename = "difficultyuint64")]
    pub difficulty_u64: u64,
    /// Chain height
    pub height: u64,
    /// Blocks found by this miner
    pub blocks: u64,
    /// Mini-blocks found by this miner
    #[serde(rename = "miniblocks")]
    pub mini_blocks: u64,
    /// Rejected submissions
    pub rejected: u64,
    /// Last error reported by the job source, empty if none
    #[serde(rename = "lasterror")]
    pub last_error: String,
    /// Free-form status line
    pub status: String,
}

impl JobMessage {
    /// Parses a text frame
    pub fn parse(text: &str) -> Result<Self, MinerError> {
        let msg: JobMessage = serde_json::from_str(text)?;
        if msg.job_id.is_empty() && msg.blob.is_empty() {
            return Err(MinerError::ProtocolError(
                "job message carries neither jobid nor blob".into(),
            ));
        }
        Ok(msg)
    }
}

/// Outbound solution submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitMessage {
    /// Job the solution was found for
    #[serde(rename = "jobid")]
    pub job_id: String,
    /// Hex-encoded full work buffer
    #[serde(rename = "mbl_blob")]
    pub blob: String,
}

impl SubmitMessage {
    /// Serializes the submission as a JSON text frame payload
    pub fn to_json(&self) -> Result<String, MinerError> {
        Ok(serde_json::to_string(self)?)
    }
}
