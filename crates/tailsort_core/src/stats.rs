//! Processor statistics.
//!
//! All counters are atomic and monotonically increasing, so they can be
//! read while events are being handled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing what a processor has done so far.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    /// Lines read from input logs.
    lines_read: AtomicU64,
    /// Bytes read from input logs.
    bytes_read: AtomicU64,
    /// Failed input reads.
    read_errors: AtomicU64,
    /// Successful flushes.
    flushes: AtomicU64,
    /// Failed flushes.
    flush_failures: AtomicU64,
    /// Lines appended to the output log.
    lines_written: AtomicU64,
    /// Bytes appended to the output log.
    bytes_written: AtomicU64,
    /// Lines dropped for lacking a sort key.
    malformed_lines: AtomicU64,
}

impl ProcessorStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self, lines: usize, bytes: usize) {
        self.lines_read.fetch_add(lines as u64, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, lines: usize, bytes: usize) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.lines_written.fetch_add(lines as u64, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_partial_write(&self, lines: usize, bytes: usize) {
        self.lines_written.fetch_add(lines as u64, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_flush_failure(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self, lines: usize) {
        self.malformed_lines.fetch_add(lines as u64, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            malformed_lines: self.malformed_lines.load(Ordering::Relaxed),
        }
    }
}

/// A copy of [`ProcessorStats`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Lines read from input logs.
    pub lines_read: u64,
    /// Bytes read from input logs.
    pub bytes_read: u64,
    /// Failed input reads.
    pub read_errors: u64,
    /// Successful flushes.
    pub flushes: u64,
    /// Failed flushes.
    pub flush_failures: u64,
    /// Lines appended to the output log.
    pub lines_written: u64,
    /// Bytes appended to the output log.
    pub bytes_written: u64,
    /// Lines dropped for lacking a sort key.
    pub malformed_lines: u64,
}
