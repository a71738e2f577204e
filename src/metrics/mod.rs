//! Built-in metrics for watcher operations.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Reload attempts/success/failures
//! - Reload duration
//! - Content changes
//! - Watch re-registrations
//! - Event subsystem errors
//!
//! # Examples
//!
//! ```rust,no_run
//! use swapwatch::prelude::*;
//! use opentelemetry::global;
//!
//! # async fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let watcher = FileWatcher::builder("/etc/secrets/token")
//!     .with_metrics(meter)
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod watch_metrics;

pub use watch_metrics::WatchMetrics;
