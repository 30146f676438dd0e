// src/types.rs
use std::fmt;

/// Version stamp of the current job template
///
/// Incremented exactly once per accepted template update. A search is only
/// valid while the worker's cached version equals the store's.
pub type JobVersion = u64;

/// Maximum number of parallel search workers
///
/// Worker identifiers occupy a single byte of the work buffer.
pub const MAX_WORKERS: usize = 256;

/// Connection state of the job feed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FeedState {
    /// No connection; either idle or waiting out the reconnect delay
    #[default]
    Disconnected,

    /// Websocket handshake in progress
    Connecting,

    /// Connected and reading job messages
    Subscribed,
}

impl FeedState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            FeedState::Disconnected => 0,
            FeedState::Connecting => 1,
            FeedState::Subscribed => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => FeedState::Connecting,
            2 => FeedState::Subscribed,
            _ => FeedState::Disconnected,
        }
    }
}

impl fmt::Display for FeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedState::Disconnected => write!(f, "disconnected"),
            FeedState::Connecting => write!(f, "connecting"),
            FeedState::Subscribed => write!(f, "subscribed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_state_u8_roundtrip() {
        for state in [
            FeedState::Disconnected,
            FeedState::Connecting,
            FeedState::Subscribed,
        ] {
            assert_eq!(FeedState::from_u8(state.as_u8()), state);
        }
        assert_eq!(FeedState::from_u8(42), FeedState::Disconnected);
    }
}
