//! Core watcher types.

mod builder;
mod options;
mod snapshot;
mod watcher;

pub use builder::FileWatcherBuilder;
pub use options::{
    DEFAULT_INTERVAL, DEFAULT_SUBSCRIBE_BACKOFF, DEFAULT_SUBSCRIBE_TIMEOUT, WatchOptions,
};
pub use snapshot::{FileInfo, Snapshot, SnapshotStore};
pub use watcher::{FileWatcher, WatchState};
pub(crate) use watcher::RunGuard;
