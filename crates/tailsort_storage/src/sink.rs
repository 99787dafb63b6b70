//! Sink trait definition.

use crate::error::SinkResult;

/// An append-only destination for flushed log lines.
///
/// # Invariants
///
/// - `append` writes `data` after any previously appended bytes
/// - `append` returns the offset where `data` starts
/// - Bytes are never reordered or removed once accepted
/// - A failed `append` may leave a prefix of `data` behind; the error says
///   how long (see [`crate::SinkError::written`])
/// - Sinks must be `Send + Sync` so a processor can be shared across threads
pub trait LogSink: Send + Sync {
    /// Appends data to the end of the sink.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be opened or written.
    fn append(&self, data: &[u8]) -> SinkResult<u64>;

    /// Syncs data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> SinkResult<()>;
}
