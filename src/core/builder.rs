//! Builder for constructing FileWatcher instances.

use crate::core::{FileWatcher, WatchOptions};
use crate::error::Result;
use crate::watch::ChangeListeners;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::metrics::WatchMetrics;

/// Builder for constructing a [`FileWatcher`].
///
/// # Examples
///
/// ```rust,no_run
/// use swapwatch::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let watcher = FileWatcher::builder("/etc/config/app.yaml")
///     .with_interval(Duration::from_secs(30))
///     .with_subscribe_retry(Duration::from_millis(500), Duration::from_secs(5))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct FileWatcherBuilder {
    pub(super) path: PathBuf,
    pub(super) options: WatchOptions,
    pub(super) listeners: ChangeListeners,
    #[cfg(feature = "metrics")]
    pub(super) metrics: Option<WatchMetrics>,
}

impl FileWatcherBuilder {
    /// Create a new builder with default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: WatchOptions::default(),
            listeners: ChangeListeners::new(),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Replace all options at once, e.g. with ones loaded from a file.
    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the polling period (default: 10s).
    ///
    /// Every tick reloads the file regardless of filesystem events.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    /// Set the callback invoked with the new content whenever it changes.
    ///
    /// The callback runs on the blocking thread pool and may be slow without
    /// delaying change detection.
    pub fn with_on_change<F>(self, callback: F) -> Self
    where
        F: Fn(Bytes) + Send + Sync + 'static,
    {
        self.listeners.insert(Arc::new(callback));
        self
    }

    /// Set the pause between watch registration attempts and the total time
    /// allowed before [`FileWatcher::start`] gives up (defaults: 1s and 10s).
    pub fn with_subscribe_retry(mut self, backoff: Duration, timeout: Duration) -> Self {
        self.options.subscribe_backoff = backoff;
        self.options.subscribe_timeout = timeout;
        self
    }

    /// Choose whether attribute-change events trigger a reload (default: true).
    pub fn reload_on_attribute_change(mut self, enabled: bool) -> Self {
        self.options.reload_on_attribute_change = enabled;
        self
    }

    /// Ignore filesystem events and rely on polling alone.
    pub fn poll_only(mut self) -> Self {
        self.options.poll_only = true;
        self
    }

    /// Record reload metrics with the given OpenTelemetry meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(WatchMetrics::new(meter));
        self
    }

    /// Build the watcher.
    ///
    /// This performs the initial read of the file. No change listener fires
    /// for the initial content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The options are invalid
    /// - The initial read or stat fails
    pub async fn build(self) -> Result<FileWatcher> {
        FileWatcher::open(self).await
    }
}
