//! The reconciliation loop.
//!
//! Two independent trigger producers feed one idempotent reload: filesystem
//! events from the subscription, and a fixed-period timer. The timer is the
//! backstop for events that were dropped, coalesced, or never delivered
//! because the watch went stale after a symlink swap.

use crate::core::{FileWatcher, RunGuard, WatchState};
use crate::error::{Result, WatchError};
use crate::watch::signal::Signal;
use crate::watch::source::{EventReceiver, EventSource};
use notify::Event;
use std::path::Path;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Owns the event subscription and drives reloads for one [`FileWatcher`].
pub(crate) struct Reconciler {
    watcher: FileWatcher,
    source: Box<dyn EventSource>,
    events: EventReceiver,
}

impl Reconciler {
    pub(crate) fn new(
        watcher: FileWatcher,
        source: Box<dyn EventSource>,
        events: EventReceiver,
    ) -> Self {
        Self {
            watcher,
            source,
            events,
        }
    }

    /// Register the watch, then service events and ticks until cancelled.
    ///
    /// `_running` holds the watcher's run slot until the loop returns.
    pub(crate) async fn run(
        mut self,
        _running: RunGuard,
        token: CancellationToken,
    ) -> Result<()> {
        let path = self.watcher.path().to_path_buf();

        let subscribed = self.subscribe_with_retry(&path, &token).await;
        match subscribed {
            Ok(true) => {}
            Ok(false) => {
                self.source.close();
                debug!(path = %path.display(), "cancelled before watch was established");
                return Ok(());
            }
            Err(err) => {
                self.source.close();
                return Err(err);
            }
        }

        self.watcher.set_state(WatchState::Watching);
        info!(path = %path.display(), "watching");

        let interval = self.watcher.options().interval;
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                received = self.events.recv(), if events_open => match received {
                    Some(Ok(event)) => self.handle_event(&path, &event).await,
                    Some(Err(err)) => {
                        debug!(path = %path.display(), error = %err, "event subsystem error");
                        #[cfg(feature = "metrics")]
                        if let Some(metrics) = self.watcher.metrics() {
                            metrics.record_event_error();
                        }
                    }
                    None => {
                        debug!(path = %path.display(), "event channel closed, polling only");
                        events_open = false;
                    }
                },

                _ = ticker.tick() => {
                    trace!(path = %path.display(), "poll tick");
                    reload(&self.watcher, &path).await;
                }
            }
        }

        self.source.close();
        info!(path = %path.display(), "stopped watching");
        Ok(())
    }

    /// Try to register the watch until it succeeds or the timeout elapses.
    ///
    /// Returns `Ok(false)` if `token` is cancelled while waiting.
    async fn subscribe_with_retry(
        &mut self,
        path: &Path,
        token: &CancellationToken,
    ) -> Result<bool> {
        let timeout = self.watcher.options().subscribe_timeout;
        let backoff = self.watcher.options().subscribe_backoff;
        let deadline = Instant::now() + timeout;

        loop {
            let err = match self.source.subscribe(path) {
                Ok(()) => return Ok(true),
                Err(err) => err,
            };

            if Instant::now() >= deadline {
                return Err(WatchError::Subscribe {
                    path: path.to_path_buf(),
                    timeout,
                    source: err,
                });
            }

            warn!(path = %path.display(), error = %err, "failed to add watch, retrying");

            tokio::select! {
                _ = token.cancelled() => return Ok(false),
                _ = time::sleep(backoff) => {}
            }
        }
    }

    async fn handle_event(&mut self, path: &Path, event: &Event) {
        let signal = Signal::from(&event.kind);
        trace!(path = %path.display(), %signal, "filesystem event");

        if signal.resubscribes() {
            self.resubscribe(path);
        }

        if signal.reloads(self.watcher.options().reload_on_attribute_change) {
            reload(&self.watcher, path).await;
        }
    }

    /// Re-register the watch on `path`, returning whether it took.
    ///
    /// Failures are left for later events or ticks to correct.
    fn resubscribe(&mut self, path: &Path) -> bool {
        match self.source.subscribe(path) {
            Ok(()) => {
                #[cfg(feature = "metrics")]
                if let Some(metrics) = self.watcher.metrics() {
                    metrics.record_resubscribe();
                }
                true
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "failed to re-add watch");
                false
            }
        }
    }
}

/// Reload, absorbing failures; the previous snapshot stays authoritative.
async fn reload(watcher: &FileWatcher, path: &Path) {
    if let Err(err) = watcher.reload().await {
        debug!(path = %path.display(), error = %err, "reload failed, keeping previous content");
    }
}
