//! Backup and restore of the database through the transfer server.
//!
//! The server speaks a small HTTP protocol: `status`, `valid?key=`,
//! `upload` and `download?key=`. [`TransferServerConnection`] drives one
//! operation at a time through [`State`] and reports state changes and
//! progress as [`TransferEvent`]s.

mod connection;
mod multipart;
mod user_data;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

pub use connection::TransferServerConnection;
pub use user_data::UserData;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Nothing attempted yet.
    Waiting,
    /// Checking the server status.
    Connecting,
    /// Ready for an operation.
    Connected,
    /// Talking to the server before a transfer.
    Loading,
    /// Sending the database.
    Uploading,
    /// Receiving a database.
    Downloading,
    /// The last operation failed.
    Error,
}

impl State {
    /// Whether data is moving; progress is only reported in these states.
    #[must_use]
    pub fn is_transferring(self) -> bool {
        match self {
            Self::Waiting | Self::Connecting | Self::Connected | Self::Error => false,
            Self::Loading | Self::Uploading | Self::Downloading => true,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Waiting => "waiting",
            Self::Connecting => "connecting to server",
            Self::Connected => "connected",
            Self::Loading => "loading",
            Self::Uploading => "uploading",
            Self::Downloading => "downloading",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Why a transfer operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ServerError {
    /// The server's host couldn't be resolved.
    #[error("no internet connection is available")]
    NoInternet,

    /// The server doesn't know the key.
    #[error("the transfer key is not valid")]
    InvalidKey,

    /// The server isn't accepting transfers.
    #[error("the transfer server is unavailable, try again later")]
    ServerUnavailable,

    /// Connecting or reading took too long.
    #[error("the connection to the transfer server timed out")]
    Timeout,

    /// The operation was cancelled through its handle.
    #[error("the transfer was cancelled")]
    Cancelled,

    /// Reading or writing data failed.
    #[error("the transfer failed while reading or writing data")]
    Io,

    /// The file to upload doesn't exist.
    #[error("the database file could not be found")]
    FileNotFound,

    /// The server address can't be turned into a URL.
    #[error("the transfer server address is not valid")]
    MalformedUrl,

    /// An operation was started before the connection was prepared.
    #[error("not connected to the transfer server")]
    NotConnected,

    /// Anything else.
    #[error("an unknown error occurred")]
    Unknown,
}

impl ServerError {
    /// Classify a failed HTTP request.
    pub(crate) fn from_request(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::MalformedUrl
        } else if err.is_connect() {
            Self::ServerUnavailable
        } else if err.is_body() || err.is_decode() || err.is_request() {
            Self::Io
        } else {
            Self::Unknown
        }
    }
}

/// Something observers of a connection should know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// The connection moved to a new state.
    StateChanged {
        /// The new state.
        state: State,
        /// Why, when the new state is [`State::Error`].
        error: Option<ServerError>,
    },
    /// Percentage of the current transfer completed.
    Progress(u8),
}

/// A cloneable handle for cancelling the running operation.
#[derive(Debug, Clone, Default)]
pub struct TransferHandle {
    cancelled: Arc<AtomicBool>,
}

impl TransferHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running operation to stop at the next chunk.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the cancellation request.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Turns byte counts into increasing whole percentages.
#[derive(Debug, Default)]
pub(crate) struct ProgressTracker {
    last: u8,
}

impl ProgressTracker {
    /// The new percentage if it went up since the last report.
    pub(crate) fn advance(&mut self, done: u64, total: u64) -> Option<u8> {
        if total == 0 {
            return None;
        }
        let percent = u8::try_from(done.min(total) * 100 / total).unwrap_or(100);
        if percent > self.last {
            self.last = percent;
            Some(percent)
        } else {
            None
        }
    }
}
