//! Error types for sink operations.

use std::io;
use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur while writing to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// An I/O error occurred before any byte was written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The write stopped after a prefix of the data had been accepted.
    #[error("partial write after {written} bytes: {source}")]
    Partial {
        /// Bytes of the data that are now in the sink.
        written: usize,
        /// Why the write stopped.
        #[source]
        source: io::Error,
    },

    /// The sink refused the write.
    #[error("sink rejected write: {0}")]
    Rejected(String),
}

impl SinkError {
    /// Creates the error for a write that stopped after `written` bytes.
    ///
    /// Falls back to [`SinkError::Io`] when nothing was written.
    pub fn partial(written: usize, source: io::Error) -> Self {
        if written == 0 {
            Self::Io(source)
        } else {
            Self::Partial { written, source }
        }
    }

    /// Returns how many bytes of the failed write reached the sink.
    #[must_use]
    pub fn written(&self) -> usize {
        match self {
            Self::Partial { written, .. } => *written,
            Self::Io(_) | Self::Rejected(_) => 0,
        }
    }
}
