// src/network/mod.rs
//! Network communication components
//!
//! This module handles the connection to the job source:
//! - `protocol`: JSON job and submission messages
//! - `feed`: websocket client that installs jobs and submits solutions

/// Job feed client
///
/// Manages the websocket lifecycle, reconnect backoff and the submission path.
pub mod feed;

/// Wire message definitions
pub mod protocol;

// Re-export main components for cleaner imports
pub use feed::{FeedConfig, JobFeed, Submitter};
pub use protocol::{JobMessage, SubmitMessage};
