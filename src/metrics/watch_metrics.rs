//! Watcher metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Histogram, Meter};
use std::time::Instant;

/// Metrics collector for reload and subscription activity.
///
/// # Examples
///
/// ```rust,no_run
/// use swapwatch::metrics::WatchMetrics;
/// use opentelemetry::global;
///
/// let metrics = WatchMetrics::new(global::meter("swapwatch"));
///
/// let timer = metrics.start_reload();
/// // ... perform reload ...
/// metrics.record_reload_success(timer, true);
/// ```
#[derive(Clone)]
pub struct WatchMetrics {
    reload_attempts: Counter<u64>,
    reload_success: Counter<u64>,
    reload_failures: Counter<u64>,
    reload_duration: Histogram<f64>,
    content_changes: Counter<u64>,
    resubscriptions: Counter<u64>,
    event_errors: Counter<u64>,
}

impl WatchMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let reload_attempts = meter
            .u64_counter("swapwatch.reload.attempts")
            .with_description("Total number of reload attempts")
            .build();

        let reload_success = meter
            .u64_counter("swapwatch.reload.success")
            .with_description("Number of successful reloads")
            .build();

        let reload_failures = meter
            .u64_counter("swapwatch.reload.failures")
            .with_description("Number of reloads that failed to read or stat the file")
            .build();

        let reload_duration = meter
            .f64_histogram("swapwatch.reload.duration")
            .with_description("Duration of reload operations in seconds")
            .with_unit("s")
            .build();

        let content_changes = meter
            .u64_counter("swapwatch.content.changes")
            .with_description("Number of reloads that found different content")
            .build();

        let resubscriptions = meter
            .u64_counter("swapwatch.watch.resubscriptions")
            .with_description("Number of watch re-registrations after remove or attribute events")
            .build();

        let event_errors = meter
            .u64_counter("swapwatch.watch.event_errors")
            .with_description("Number of errors reported by the event subsystem")
            .build();

        Self {
            reload_attempts,
            reload_success,
            reload_failures,
            reload_duration,
            content_changes,
            resubscriptions,
            event_errors,
        }
    }

    /// Start a reload operation timer.
    ///
    /// Pass the returned `Instant` to `record_reload_success` or
    /// `record_reload_failure` when the operation completes.
    pub fn start_reload(&self) -> Instant {
        self.reload_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a successful reload and whether it changed the content.
    pub fn record_reload_success(&self, start: Instant, changed: bool) {
        self.reload_success.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
        if changed {
            self.content_changes.add(1, &[]);
        }
    }

    /// Record a failed reload.
    pub fn record_reload_failure(&self, start: Instant) {
        self.reload_failures.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a watch re-registration.
    pub fn record_resubscribe(&self) {
        self.resubscriptions.add(1, &[]);
    }

    /// Record an error delivered by the event subsystem.
    pub fn record_event_error(&self) {
        self.event_errors.add(1, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::global;

    #[test]
    fn test_metrics_creation() {
        let metrics = WatchMetrics::new(global::meter("test"));

        // Test basic operations don't panic
        let timer = metrics.start_reload();
        metrics.record_reload_success(timer, true);

        let timer = metrics.start_reload();
        metrics.record_reload_failure(timer);

        metrics.record_resubscribe();
        metrics.record_event_error();
    }

    #[tokio::test]
    async fn test_watcher_with_metrics() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("data");
        std::fs::write(&path, "v1").unwrap();

        let watcher = crate::core::FileWatcher::builder(&path)
            .with_metrics(global::meter("test"))
            .build()
            .await
            .unwrap();

        std::fs::write(&path, "v2").unwrap();
        assert!(watcher.reload().await.unwrap());
        std::fs::remove_file(&path).unwrap();
        assert!(watcher.reload().await.is_err());
    }
}
