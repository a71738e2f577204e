//! Filesystem event handling and the reconciliation loop.
//!
//! Provides the event subscription, signal classification, and change
//! notifications that keep a [`FileWatcher`](crate::core::FileWatcher) current.

pub mod listeners;
mod reconciler;
pub mod signal;
pub mod source;

pub use listeners::{ChangeListeners, Listener, SubscriptionHandle};
pub(crate) use reconciler::Reconciler;
pub use signal::Signal;
pub use source::{EventReceiver, EventSender, EventSource, NotifySource, NullSource};
