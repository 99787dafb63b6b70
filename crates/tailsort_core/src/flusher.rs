//! Sorted, append-only flushing of a drained batch.

use crate::config::KeyPolicy;
use crate::error::CoreError;
use crate::key::order_batch;
use std::sync::Arc;
use tailsort_storage::LogSink;
use thiserror::Error;
use tracing::{debug, warn};

/// Summary of a successful flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Offset in the output log where the batch starts.
    pub offset: u64,
    /// Lines appended.
    pub lines_written: usize,
    /// Bytes appended.
    pub bytes_written: usize,
    /// Lines dropped for lacking a sort key.
    pub skipped: usize,
}

/// A flush that did not reach the output log.
#[derive(Debug, Error)]
#[error("flush failed: {error}")]
pub struct FlushFailure {
    /// Why the flush failed.
    #[source]
    pub error: CoreError,
    /// Lines that were not written and can be buffered again, in key order.
    ///
    /// Empty when the batch was rejected before ordering finished.
    pub pending: Vec<String>,
    /// Lines dropped for lacking a sort key. Under [`KeyPolicy::Strict`]
    /// this is the one line that failed the batch.
    pub skipped: usize,
    /// Lines that reached the output log completely before the write failed.
    pub lines_written: usize,
    /// Bytes that reached the output log before the write failed.
    pub bytes_written: usize,
}

/// Orders batches by key and appends them to a [`LogSink`].
///
/// Each batch goes out as a single append of the concatenated lines, with no
/// separators added. Output that has been accepted is never touched again.
pub struct Flusher {
    sink: Arc<dyn LogSink>,
    policy: KeyPolicy,
    sync_on_flush: bool,
}

impl std::fmt::Debug for Flusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flusher")
            .field("policy", &self.policy)
            .field("sync_on_flush", &self.sync_on_flush)
            .finish_non_exhaustive()
    }
}

impl Flusher {
    /// Creates a flusher writing to `sink`.
    pub fn new(sink: Arc<dyn LogSink>, policy: KeyPolicy, sync_on_flush: bool) -> Self {
        Self {
            sink,
            policy,
            sync_on_flush,
        }
    }

    /// Orders `batch` and appends it to the sink.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingSortKey`] under [`KeyPolicy::Strict`]; the batch
    ///   is discarded and `pending` is empty
    /// - [`CoreError::Sink`] if the append fails; `pending` holds the ordered
    ///   lines that did not fully reach the sink. A line cut off by a partial
    ///   write is kept in `pending`, so its written prefix stays in the
    ///   output as a fragment.
    pub fn flush(&self, batch: Vec<String>) -> Result<FlushReport, FlushFailure> {
        let mut ordered = order_batch(batch, self.policy).map_err(|error| FlushFailure {
            error,
            pending: Vec::new(),
            skipped: 1,
            lines_written: 0,
            bytes_written: 0,
        })?;

        let bytes: Vec<u8> = ordered
            .lines
            .iter()
            .flat_map(|line| line.as_bytes().iter().copied())
            .collect();

        let offset = match self.sink.append(&bytes) {
            Ok(offset) => offset,
            Err(e) => {
                let written = e.written();
                let done = complete_lines(&ordered.lines, written);
                let pending = ordered.lines.split_off(done);
                return Err(FlushFailure {
                    error: e.into(),
                    pending,
                    skipped: ordered.skipped.len(),
                    lines_written: done,
                    bytes_written: written,
                });
            }
        };

        if self.sync_on_flush {
            // The bytes are already appended; a sync failure must not cause a rewrite.
            if let Err(e) = self.sink.sync() {
                warn!(error = %e, "output log sync failed");
            }
        }

        let report = FlushReport {
            offset,
            lines_written: ordered.lines.len(),
            bytes_written: bytes.len(),
            skipped: ordered.skipped.len(),
        };
        debug!(
            offset,
            lines = report.lines_written,
            bytes = report.bytes_written,
            skipped = report.skipped,
            "flushed batch"
        );
        Ok(report)
    }
}

/// Counts the leading lines that fit entirely in the first `written` bytes.
fn complete_lines(lines: &[String], written: usize) -> usize {
    let mut end = 0;
    lines
        .iter()
        .take_while(|line| {
            end += line.len();
            end <= written
        })
        .count()
}
