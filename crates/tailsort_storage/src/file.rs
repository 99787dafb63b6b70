//! File-based sink for the consolidated output log.

use crate::error::{SinkError, SinkResult};
use crate::sink::LogSink;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// A sink that appends to a file on disk.
///
/// The file is opened in append mode for every write and closed again
/// afterwards, so a file that is removed or made writable between two
/// flushes is picked up on the next attempt.
///
/// # Thread Safety
///
/// Writes from the same `FileSink` are serialized by an internal lock.
///
/// # Example
///
/// ```no_run
/// use tailsort_storage::{LogSink, FileSink};
///
/// let sink = FileSink::new("processed_output.log");
/// sink.append(b"event<1.0>\n").unwrap();
/// sink.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSink {
    /// Creates a sink for the file at `path`.
    ///
    /// Nothing is opened until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn open_append(&self) -> SinkResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(file)
    }
}

impl LogSink for FileSink {
    /// Appends `data` to the file.
    ///
    /// If the disk fills up midway, the bytes already written stay in the
    /// file and the error is [`SinkError::Partial`] carrying their count.
    fn append(&self, data: &[u8]) -> SinkResult<u64> {
        let _guard = self.write_lock.lock();

        let mut file = self.open_append()?;
        let offset = file.metadata()?.len();

        let mut written = 0;
        while written < data.len() {
            match file.write(&data[written..]) {
                Ok(0) => {
                    return Err(SinkError::partial(
                        written,
                        io::Error::new(io::ErrorKind::WriteZero, "output log accepted no bytes"),
                    ))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(SinkError::partial(written, e)),
            }
        }

        Ok(offset)
    }

    fn sync(&self) -> SinkResult<()> {
        let _guard = self.write_lock.lock();
        let file = self.open_append()?;
        file.sync_all()?;
        Ok(())
    }
}
