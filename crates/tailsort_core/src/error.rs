//! Error types for tailsort core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while tailing, ordering or flushing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Output sink error.
    #[error("sink error: {0}")]
    Sink(#[from] tailsort_storage::SinkError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An input log could not be opened, positioned or read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// The input log.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A line carries no `<number>` sort key.
    #[error("no numeric sort key in line {line:?}")]
    MissingSortKey {
        /// The offending line, terminator included.
        line: String,
    },

    /// Configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a read error for `path`.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a missing sort key error.
    pub fn missing_sort_key(line: impl Into<String>) -> Self {
        Self::MissingSortKey { line: line.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
