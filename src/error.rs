//! Error types for swapwatch.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for swapwatch operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur when constructing or starting a watcher.
///
/// Only errors that keep a watcher from ever becoming usable are surfaced.
/// Failures after the reconciliation loop is running are absorbed and
/// corrected by the next event or timer tick.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The initial read or stat of the watched path failed.
    #[error("Failed to read initial file {}: {source}", .path.display())]
    InitialRead {
        /// The watched path
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The watch registration could not be established in time.
    #[error("Failed to add watch for {} after {timeout:?}: {source}", .path.display())]
    Subscribe {
        /// The watched path
        path: PathBuf,
        /// Total time spent retrying
        timeout: Duration,
        /// The error from the last attempt
        #[source]
        source: notify::Error,
    },

    /// The filesystem event subsystem could not be initialized.
    #[error("Failed to create event source: {0}")]
    EventSource(#[from] notify::Error),

    /// The reconciliation loop is already running for this watcher.
    #[error("Watcher is already running")]
    AlreadyRunning,

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Watch options could not be loaded or are invalid.
    #[error("Invalid watch options: {0}")]
    Options(String),
}

impl From<config::ConfigError> for WatchError {
    fn from(err: config::ConfigError) -> Self {
        WatchError::Options(err.to_string())
    }
}
