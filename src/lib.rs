//! # swapwatch
//!
//! Keep the content of one file cached in memory, correctly, even when the
//! file is updated through an atomic directory-symlink swap.
//!
//! ## Overview
//!
//! Orchestrated volume mounts (Kubernetes ConfigMaps and Secrets, for example)
//! update files by repointing a `..data -> ..data_N` symlink at a new directory
//! and deleting the old one. Plain event watchers break across such a swap:
//! they see the old target being removed, never a modification of the visible
//! path, and their registration keeps pointing at a deleted inode.
//!
//! `swapwatch` combines:
//! - Filesystem events, with the watch re-registered after removal or
//!   attribute-change signals so it follows the new target
//! - A polling timer that reloads unconditionally as a correctness backstop
//! - Lock-free, tear-free reads of the current content using `arc-swap`
//! - Change callbacks dispatched off the reconciliation path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swapwatch::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> swapwatch::error::Result<()> {
//! let watcher = FileWatcher::builder("/etc/secrets/tls.crt")
//!     .with_interval(Duration::from_secs(5))
//!     .with_on_change(|content| println!("certificate rotated ({} bytes)", content.len()))
//!     .build()
//!     .await?;
//!
//! let token = CancellationToken::new();
//! let task = watcher.spawn(token.clone());
//!
//! // Reads never block on I/O
//! let cert = watcher.get();
//! println!("{} bytes", cert.len());
//!
//! token.cancel();
//! task.await.expect("watcher task panicked")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics`: OpenTelemetry counters for reloads, changes and re-subscriptions

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod watch;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{FileInfo, FileWatcher, FileWatcherBuilder, WatchOptions, WatchState};
    pub use crate::error::{Result, WatchError};
    pub use crate::watch::SubscriptionHandle;
    pub use bytes::Bytes;
    pub use tokio_util::sync::CancellationToken;
}
