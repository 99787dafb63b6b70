//! The processor tying tailing, batching and flushing together.

use crate::batch::BatchCache;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::flusher::Flusher;
use crate::schedule::FlushSchedule;
use crate::stats::{ProcessorStats, StatsSnapshot};
use crate::tailer::Tailer;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tailsort_storage::{FileSink, LogSink};
use tracing::{debug, error, info, warn};

/// Result of handling one input log change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// New lines picked up from the file.
    pub lines: usize,
    /// Whether a flush reached the output log during this call.
    pub flushed: bool,
}

/// Owns the cursor store, the batch cache and the flush state.
///
/// Built once at startup and shared (usually behind an `Arc`) with whatever
/// delivers filesystem events. Each operation runs under one lock, so event
/// handlers on different threads never see a half-updated cursor or batch.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tailsort_core::{Config, LogProcessor};
/// use tailsort_storage::InMemorySink;
///
/// let sink = Arc::new(InMemorySink::new());
/// let processor = LogProcessor::with_sink(Config::default(), sink.clone()).unwrap();
/// assert_eq!(processor.pending_lines(), 0);
/// ```
pub struct LogProcessor {
    config: Config,
    tailer: Tailer,
    cache: BatchCache,
    flusher: Flusher,
    /// Guards every operation, not just the timestamp.
    schedule: Mutex<FlushSchedule>,
    stats: ProcessorStats,
}

impl std::fmt::Debug for LogProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogProcessor")
            .field("config", &self.config)
            .field("tracked_files", &self.tailer.cursors().len())
            .field("pending_lines", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl LogProcessor {
    /// Creates a processor appending to `config.output_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn open(config: Config) -> CoreResult<Self> {
        let sink = Arc::new(FileSink::new(config.output_path.clone()));
        Self::with_sink(config, sink)
    }

    /// Creates a processor writing to `sink`, with the flush window starting now.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_sink(config: Config, sink: Arc<dyn LogSink>) -> CoreResult<Self> {
        Self::with_sink_at(config, sink, Instant::now())
    }

    /// Creates a processor whose first flush window starts at `started`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_sink_at(
        config: Config,
        sink: Arc<dyn LogSink>,
        started: Instant,
    ) -> CoreResult<Self> {
        config.validate()?;

        let flusher = Flusher::new(sink, config.key_policy, config.sync_on_flush);
        let schedule = FlushSchedule::new(config.flush_interval, started);

        Ok(Self {
            config,
            tailer: Tailer::new(),
            cache: BatchCache::new(),
            flusher,
            schedule: Mutex::new(schedule),
            stats: ProcessorStats::new(),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Picks up new lines from `path` and flushes if the interval has passed.
    ///
    /// The flush time recorded is taken after the output write completes.
    pub fn process_log(&self, path: &Path) -> ProcessOutcome {
        self.process(path, Instant::now(), Instant::now)
    }

    /// Like [`LogProcessor::process_log`] with an explicit clock reading.
    ///
    /// `now` is used both for the due check and as the flush time.
    pub fn process_log_at(&self, path: &Path, now: Instant) -> ProcessOutcome {
        self.process(path, now, move || now)
    }

    fn process(
        &self,
        path: &Path,
        now: Instant,
        flushed_at: impl FnOnce() -> Instant,
    ) -> ProcessOutcome {
        let mut schedule = self.schedule.lock();

        let lines = match self.tailer.read(path) {
            Ok(lines) => {
                let bytes = lines.iter().map(String::len).sum();
                self.stats.record_read(lines.len(), bytes);
                lines
            }
            Err(_) => {
                self.stats.record_read_error();
                Vec::new()
            }
        };

        let count = lines.len();
        self.cache.append(lines);

        let flushed = schedule.is_due_at(now) && self.flush_locked(&mut schedule, flushed_at);
        ProcessOutcome {
            lines: count,
            flushed,
        }
    }

    /// Forgets the cursor of a deleted input log.
    ///
    /// Returns the offset that was recorded for it. Does not flush.
    pub fn remove_input_log(&self, path: &Path) -> Option<u64> {
        let _schedule = self.schedule.lock();
        let offset = self.tailer.forget(path);
        if let Some(offset) = offset {
            debug!(path = %path.display(), offset, "forgot input log");
        }
        offset
    }

    /// Flushes the batch immediately, ignoring the interval.
    ///
    /// Returns true if the batch reached the output log.
    pub fn flush_now(&self) -> bool {
        let mut schedule = self.schedule.lock();
        self.flush_locked(&mut schedule, Instant::now)
    }

    /// Like [`LogProcessor::flush_now`] with an explicit clock reading.
    pub fn flush_now_at(&self, now: Instant) -> bool {
        let mut schedule = self.schedule.lock();
        self.flush_locked(&mut schedule, move || now)
    }

    /// Final flush on graceful shutdown, if enabled.
    ///
    /// Returns true if buffered lines were written.
    pub fn shutdown(&self) -> bool {
        let pending = self.cache.len();
        if pending == 0 {
            return false;
        }
        if !self.config.flush_on_shutdown {
            warn!(lines = pending, "discarding unflushed lines on shutdown");
            return false;
        }
        info!(lines = pending, "flushing remaining lines before shutdown");
        self.flush_now()
    }

    /// Returns the number of buffered lines.
    #[must_use]
    pub fn pending_lines(&self) -> usize {
        self.cache.len()
    }

    /// Returns the recorded offset for `path`.
    #[must_use]
    pub fn cursor(&self, path: &Path) -> Option<u64> {
        self.tailer.cursors().get(path)
    }

    /// Returns the time of the last successful flush.
    #[must_use]
    pub fn last_flush(&self) -> Instant {
        self.schedule.lock().last_flush()
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn flush_locked(
        &self,
        schedule: &mut FlushSchedule,
        flushed_at: impl FnOnce() -> Instant,
    ) -> bool {
        let batch = self.cache.drain();

        match self.flusher.flush(batch) {
            Ok(report) => {
                schedule.mark_flushed(flushed_at());
                self.stats
                    .record_flush(report.lines_written, report.bytes_written);
                self.stats.record_malformed(report.skipped);
                true
            }
            Err(failure) => {
                self.stats.record_flush_failure();
                self.stats.record_malformed(failure.skipped);
                self.stats
                    .record_partial_write(failure.lines_written, failure.bytes_written);
                match &failure.error {
                    CoreError::MissingSortKey { .. } => {
                        error!(error = %failure.error, "batch discarded");
                    }
                    _ => {
                        error!(
                            error = %failure.error,
                            lines = failure.pending.len(),
                            written = failure.lines_written,
                            "output log write failed, batch kept for retry"
                        );
                    }
                }
                self.cache.restore(failure.pending);
                false
            }
        }
    }
}
