//! The watcher handle providing lock-free access to file content.

use crate::core::snapshot::{FileInfo, Snapshot, SnapshotStore, read_snapshot};
use crate::core::{FileWatcherBuilder, WatchOptions};
use crate::error::{Result, WatchError};
use crate::watch::source::{self, EventSender, EventSource};
use crate::watch::{ChangeListeners, Reconciler, SubscriptionHandle};
use bytes::Bytes;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[cfg(feature = "metrics")]
use crate::metrics::WatchMetrics;

/// Lifecycle of the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Constructed, never started.
    Idle,
    /// Establishing the watch registration.
    Initializing,
    /// Servicing events and timer ticks.
    Watching,
    /// The last run has ended.
    Stopped,
}

pub(crate) struct Shared {
    path: PathBuf,
    options: WatchOptions,
    store: SnapshotStore,
    listeners: ChangeListeners,
    state: Mutex<WatchState>,
    #[cfg(feature = "metrics")]
    metrics: Option<WatchMetrics>,
}

/// Cached content of a single file, kept current across symlink swaps.
///
/// Cloning is cheap; every clone shares the same snapshot and listeners.
///
/// # Examples
///
/// ```rust,no_run
/// use swapwatch::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let watcher = FileWatcher::builder("/var/run/secrets/kubernetes.io/serviceaccount/ca.crt")
///     .with_interval(std::time::Duration::from_secs(5))
///     .with_on_change(|content| println!("CA reloaded, {} bytes", content.len()))
///     .build()
///     .await?;
///
/// let token = CancellationToken::new();
/// let _task = watcher.spawn(token.clone());
///
/// let ca = watcher.get();
/// println!("Current CA size: {} bytes", ca.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FileWatcher {
    shared: Arc<Shared>,
}

impl FileWatcher {
    /// Create a builder for watching `path`.
    pub fn builder(path: impl Into<PathBuf>) -> FileWatcherBuilder {
        FileWatcherBuilder::new(path)
    }

    /// Watch `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InitialRead`] if the file cannot be read.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(path).build().await
    }

    /// Perform the initial load and assemble the handle.
    pub(crate) async fn open(builder: FileWatcherBuilder) -> Result<Self> {
        let FileWatcherBuilder {
            path,
            options,
            listeners,
            #[cfg(feature = "metrics")]
            metrics,
        } = builder;
        options.validate()?;

        let initial = read_snapshot(&path)
            .await
            .map_err(|source| WatchError::InitialRead {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = initial.content().len(), "initial load");

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                options,
                store: SnapshotStore::new(initial),
                listeners,
                state: Mutex::new(WatchState::Idle),
                #[cfg(feature = "metrics")]
                metrics,
            }),
        })
    }

    /// Get the current content.
    ///
    /// Never blocks on I/O.
    pub fn get(&self) -> Bytes {
        self.shared.store.load().content().clone()
    }

    /// Get the current content together with a file-info record.
    ///
    /// Both come from the same reload.
    pub fn get_with_metadata(&self) -> (Bytes, FileInfo) {
        let snapshot = self.shared.store.load();
        let info = FileInfo::new(&self.shared.path, &snapshot);
        (snapshot.content().clone(), info)
    }

    /// Get the current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.shared.store.load()
    }

    /// Re-read the file and update the snapshot.
    ///
    /// Returns `Ok(true)` when the content changed, in which case change
    /// listeners are dispatched in the background. On error nothing is
    /// mutated and the previous snapshot stays visible.
    ///
    /// Safe to call while the watcher is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or the stat fails.
    pub async fn reload(&self) -> Result<bool> {
        #[cfg(feature = "metrics")]
        let timer = self.metrics().map(|m| m.start_reload());

        let snapshot = match read_snapshot(&self.shared.path).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                #[cfg(feature = "metrics")]
                if let (Some(metrics), Some(timer)) = (self.metrics(), timer) {
                    metrics.record_reload_failure(timer);
                }
                return Err(err.into());
            }
        };

        let content = snapshot.content().clone();
        let changed = self.shared.store.replace(snapshot);

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (self.metrics(), timer) {
            metrics.record_reload_success(timer, changed);
        }

        if changed {
            debug!(path = %self.shared.path.display(), bytes = content.len(), "content changed");
            self.shared.listeners.notify_all(&content);
        }

        Ok(changed)
    }

    /// Run the reconciliation loop until `token` is cancelled.
    ///
    /// Returns `Ok(())` on cancellation, including cancellation while the
    /// watch registration is still being retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch cannot be registered within the
    /// configured timeout, if the event subsystem cannot be created, or if
    /// this watcher is already running.
    pub async fn start(&self, token: CancellationToken) -> Result<()> {
        let poll_only = self.shared.options.poll_only;
        self.start_with(token, |tx| source::open(poll_only, tx)).await
    }

    /// Claim the run slot, then open an event source with `open` and run.
    ///
    /// The source is only created once this watcher is known not to be
    /// running already.
    pub(crate) async fn start_with<F>(&self, token: CancellationToken, open: F) -> Result<()>
    where
        F: FnOnce(EventSender) -> notify::Result<Box<dyn EventSource>>,
    {
        let running = RunGuard::acquire(self)?;
        let (tx, events) = mpsc::unbounded_channel();
        let source = open(tx)?;
        Reconciler::new(self.clone(), source, events)
            .run(running, token)
            .await
    }

    /// Run the reconciliation loop as a background task.
    pub fn spawn(&self, token: CancellationToken) -> JoinHandle<Result<()>> {
        let watcher = self.clone();
        tokio::spawn(async move { watcher.start(token).await })
    }

    /// Register an additional change listener.
    ///
    /// The listener receives the new content each time a reload finds it
    /// changed. Dropping the handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(Bytes) + Send + Sync + 'static,
    {
        self.shared.listeners.subscribe(callback)
    }

    /// The watched path.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// The options this watcher was built with.
    pub fn options(&self) -> &WatchOptions {
        &self.shared.options
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatchState {
        *self.shared.state.lock()
    }

    pub(crate) fn set_state(&self, state: WatchState) {
        *self.shared.state.lock() = state;
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn metrics(&self) -> Option<&WatchMetrics> {
        self.shared.metrics.as_ref()
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("path", &self.shared.path)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Marks a watcher as running for as long as it lives.
///
/// Resets the state to [`WatchState::Stopped`] on drop, so an aborted task
/// does not leave the watcher looking busy.
pub(crate) struct RunGuard {
    watcher: FileWatcher,
}

impl RunGuard {
    pub(crate) fn acquire(watcher: &FileWatcher) -> Result<Self> {
        let mut state = watcher.shared.state.lock();
        if matches!(*state, WatchState::Initializing | WatchState::Watching) {
            return Err(WatchError::AlreadyRunning);
        }
        *state = WatchState::Initializing;

        Ok(Self {
            watcher: watcher.clone(),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.watcher.set_state(WatchState::Stopped);
    }
}
