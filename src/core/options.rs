//! Tunable watcher settings.

use crate::error::{Result, WatchError};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

/// Default polling period for the timer backstop.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default total time spent retrying the initial watch registration.
pub const DEFAULT_SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause between watch registration attempts.
pub const DEFAULT_SUBSCRIBE_BACKOFF: Duration = Duration::from_secs(1);

/// Settings that control how a [`FileWatcher`](crate::core::FileWatcher) reconciles.
///
/// Options can be set through the builder, or loaded from a file or the
/// environment and handed to [`FileWatcherBuilder::with_options`](crate::core::FileWatcherBuilder::with_options).
/// Durations are given in milliseconds when deserialized.
///
/// # Examples
///
/// ```rust,no_run
/// use swapwatch::core::WatchOptions;
///
/// # fn example() -> swapwatch::error::Result<()> {
/// // SWAPWATCH_INTERVAL_MS=5000 -> interval = 5s
/// let options = WatchOptions::from_env("SWAPWATCH")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Polling period; every tick triggers an unconditional reload.
    #[serde(rename = "interval_ms", deserialize_with = "millis")]
    pub interval: Duration,

    /// How long to keep retrying the initial watch registration.
    #[serde(rename = "subscribe_timeout_ms", deserialize_with = "millis")]
    pub subscribe_timeout: Duration,

    /// Pause between watch registration attempts.
    #[serde(rename = "subscribe_backoff_ms", deserialize_with = "millis")]
    pub subscribe_backoff: Duration,

    /// Whether an attribute-change signal also triggers a reload.
    ///
    /// The watch is re-registered on attribute changes either way.
    pub reload_on_attribute_change: bool,

    /// Skip filesystem events entirely and rely on the timer alone.
    pub poll_only: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            subscribe_timeout: DEFAULT_SUBSCRIBE_TIMEOUT,
            subscribe_backoff: DEFAULT_SUBSCRIBE_BACKOFF,
            reload_on_attribute_change: true,
            poll_only: false,
        }
    }
}

impl WatchOptions {
    /// Load options from a YAML, TOML or JSON file.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting options are invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let options: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from environment variables with the given prefix.
    ///
    /// `PREFIX_INTERVAL_MS`, `PREFIX_SUBSCRIBE_TIMEOUT_MS`,
    /// `PREFIX_SUBSCRIBE_BACKOFF_MS`, `PREFIX_RELOAD_ON_ATTRIBUTE_CHANGE` and
    /// `PREFIX_POLL_ONLY` are recognized.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the resulting options
    /// are invalid.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let options: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    /// Check that the options describe a usable watcher.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Options`] for a zero interval or a zero backoff.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(WatchError::Options("interval must be non-zero".into()));
        }
        if self.subscribe_backoff.is_zero() {
            return Err(WatchError::Options(
                "subscribe backoff must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
