//! Time-windowed flush scheduling.

use std::time::{Duration, Instant};

/// Returns true once strictly more than `interval` has passed since
/// `last_flush`.
///
/// A `now` earlier than `last_flush` is never due.
#[must_use]
pub fn is_due(now: Instant, last_flush: Instant, interval: Duration) -> bool {
    now.checked_duration_since(last_flush)
        .is_some_and(|elapsed| elapsed > interval)
}

/// Tracks the time of the last successful flush.
#[derive(Debug, Clone)]
pub struct FlushSchedule {
    interval: Duration,
    last_flush: Instant,
}

impl FlushSchedule {
    /// Creates a schedule whose window starts at `started`.
    #[must_use]
    pub fn new(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            last_flush: started,
        }
    }

    /// Returns the time of the last successful flush.
    #[must_use]
    pub fn last_flush(&self) -> Instant {
        self.last_flush
    }

    /// Returns true if a flush is due at `now`.
    #[must_use]
    pub fn is_due_at(&self, now: Instant) -> bool {
        is_due(now, self.last_flush, self.interval)
    }

    /// Records a successful flush at `now`.
    pub fn mark_flushed(&mut self, now: Instant) {
        self.last_flush = now;
    }
}
