//! Filesystem event subscriptions.

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use tokio::sync::mpsc;

/// Sending half of the raw event channel.
pub type EventSender = mpsc::UnboundedSender<notify::Result<Event>>;

/// Receiving half of the raw event channel, owned by the reconciliation loop.
pub type EventReceiver = mpsc::UnboundedReceiver<notify::Result<Event>>;

/// A subscription to filesystem events for a single path.
///
/// Events and subscription errors are delivered on the channel handed to the
/// source at creation. Closing the source closes that channel.
pub trait EventSource: Send {
    /// Register (or re-register) a watch on `path`.
    ///
    /// Calling this again with the same path rebinds the watch to whatever the
    /// path resolves to now.
    fn subscribe(&mut self, path: &Path) -> notify::Result<()>;

    /// Release the subscription.
    fn close(&mut self);
}

/// Event source backed by the platform's native watcher (inotify, kqueue, ...).
pub struct NotifySource {
    watcher: Option<RecommendedWatcher>,
}

impl NotifySource {
    /// Create a native watcher that forwards every event to `tx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be created.
    pub fn new(tx: EventSender) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the loop has stopped.
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher: Some(watcher),
        })
    }
}

impl EventSource for NotifySource {
    fn subscribe(&mut self, path: &Path) -> notify::Result<()> {
        match self.watcher.as_mut() {
            Some(watcher) => watcher.watch(path, RecursiveMode::NonRecursive),
            None => Err(notify::Error::generic("event source is closed")),
        }
    }

    fn close(&mut self) {
        // Dropping the watcher stops its thread and drops the sender.
        self.watcher.take();
    }
}

/// Event source that never produces events.
///
/// Used in poll-only mode: subscribing always succeeds and the event channel
/// is closed immediately, leaving the timer as the only reload trigger.
pub struct NullSource;

impl NullSource {
    /// Create a source that drops `tx` right away.
    pub fn new(tx: EventSender) -> Self {
        drop(tx);
        Self
    }
}

impl EventSource for NullSource {
    fn subscribe(&mut self, _path: &Path) -> notify::Result<()> {
        Ok(())
    }

    fn close(&mut self) {}
}

/// Open the event source selected by `poll_only`.
pub(crate) fn open(poll_only: bool, tx: EventSender) -> notify::Result<Box<dyn EventSource>> {
    if poll_only {
        Ok(Box::new(NullSource::new(tx)))
    } else {
        Ok(Box::new(NotifySource::new(tx)?))
    }
}
