//! Change listeners invoked off the reconciliation path.

use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::Arc;

/// Callback receiving the new content after a change.
pub type Listener = Arc<dyn Fn(Bytes) + Send + Sync>;

/// Handle for a listener that can be dropped to unsubscribe.
#[must_use = "dropping the handle removes the listener"]
pub struct SubscriptionHandle {
    id: u64,
    registry: Arc<RwLock<Registry>>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        let id = self.id;
        self.registry
            .write()
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

struct Registry {
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Registry of callbacks fired when reloaded content differs from the
/// previous snapshot.
///
/// Each callback runs on the blocking thread pool, so an arbitrarily slow
/// callback never delays the next reload. Overlapping changes may run their
/// callbacks concurrently and in any order.
#[derive(Clone)]
pub struct ChangeListeners {
    inner: Arc<RwLock<Registry>>,
}

impl ChangeListeners {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Registry {
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a listener for the lifetime of the returned handle.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(Bytes) + Send + Sync + 'static,
    {
        SubscriptionHandle {
            id: self.insert(Arc::new(callback)),
            registry: Arc::clone(&self.inner),
        }
    }

    /// Register a listener that lives as long as the registry.
    pub(crate) fn insert(&self, listener: Listener) -> u64 {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, listener));
        id
    }

    /// Dispatch `content` to every listener without waiting for them.
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify_all(&self, content: &Bytes) {
        let listeners: Vec<Listener> = self
            .inner
            .read()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            let content = content.clone();
            tokio::task::spawn_blocking(move || listener(content));
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner.read().listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChangeListeners {
    fn default() -> Self {
        Self::new()
    }
}
