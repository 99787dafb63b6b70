//! Processor configuration.

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;
use std::time::Duration;

/// How long lines are buffered before a flush becomes due.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Name of the consolidated output log.
pub const DEFAULT_OUTPUT_FILE: &str = "processed_output.log";

/// What to do with a line that carries no `<number>` sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Drop the line with a warning and flush the rest of the batch.
    #[default]
    Skip,
    /// Fail the whole flush cycle and discard the batch.
    Strict,
}

/// Configuration for a [`crate::LogProcessor`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum time between two flushes.
    ///
    /// Shorter intervals lower latency at the cost of more small writes;
    /// longer ones mean fewer writes but more memory and end-to-end delay.
    pub flush_interval: Duration,

    /// Where sorted batches are appended.
    pub output_path: PathBuf,

    /// Handling of lines without a sort key.
    pub key_policy: KeyPolicy,

    /// Whether [`crate::LogProcessor::shutdown`] flushes what is still buffered.
    pub flush_on_shutdown: bool,

    /// Whether to fsync the output log after each flush.
    pub sync_on_flush: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            key_policy: KeyPolicy::Skip,
            flush_on_shutdown: true,
            sync_on_flush: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flush interval.
    #[must_use]
    pub const fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Sets the output log path.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the policy for lines without a sort key.
    #[must_use]
    pub const fn key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Sets whether shutdown flushes the remaining batch.
    #[must_use]
    pub const fn flush_on_shutdown(mut self, value: bool) -> Self {
        self.flush_on_shutdown = value;
        self
    }

    /// Sets whether each flush is followed by an fsync.
    #[must_use]
    pub const fn sync_on_flush(mut self, value: bool) -> Self {
        self.sync_on_flush = value;
        self
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the flush interval is zero or
    /// the output path is empty.
    pub fn validate(&self) -> CoreResult<()> {
        if self.flush_interval.is_zero() {
            return Err(CoreError::invalid_config("flush interval must be non-zero"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(CoreError::invalid_config("output path must not be empty"));
        }
        Ok(())
    }
}
