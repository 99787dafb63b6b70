//! In-memory sink for testing.

use crate::error::{SinkError, SinkResult};
use crate::sink::LogSink;
use parking_lot::RwLock;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory sink.
///
/// Keeps every accepted byte in a buffer. Writes can be switched to fail
/// with [`InMemorySink::set_failing`], or capped with
/// [`InMemorySink::set_capacity`] to simulate a disk filling up mid-write.
///
/// # Example
///
/// ```rust
/// use tailsort_storage::{LogSink, InMemorySink};
///
/// let sink = InMemorySink::new();
/// sink.set_failing(true);
/// assert!(sink.append(b"lost").is_err());
///
/// sink.set_failing(false);
/// sink.append(b"kept").unwrap();
/// assert_eq!(sink.data(), b"kept");
/// ```
#[derive(Debug, Default)]
pub struct InMemorySink {
    data: RwLock<Vec<u8>>,
    capacity: RwLock<Option<usize>>,
    failing: AtomicBool,
}

impl InMemorySink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Returns the written bytes as text, split into lines with terminators.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.data.read())
            .split_inclusive('\n')
            .map(str::to_owned)
            .collect()
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Limits the total size of the sink; `None` removes the limit.
    ///
    /// A write crossing the limit stores what fits and fails with
    /// [`SinkError::Partial`].
    pub fn set_capacity(&self, capacity: Option<usize>) {
        *self.capacity.write() = capacity;
    }
}

impl LogSink for InMemorySink {
    fn append(&self, new_data: &[u8]) -> SinkResult<u64> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected("in-memory sink set to fail".into()));
        }
        let mut data = self.data.write();
        let offset = data.len() as u64;

        if let Some(capacity) = *self.capacity.read() {
            let room = capacity.saturating_sub(data.len());
            if new_data.len() > room {
                data.extend_from_slice(&new_data[..room]);
                return Err(SinkError::partial(
                    room,
                    io::Error::new(io::ErrorKind::Other, "in-memory sink is full"),
                ));
            }
        }

        data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn sync(&self) -> SinkResult<()> {
        Ok(())
    }
}
