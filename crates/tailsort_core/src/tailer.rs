//! Incremental reads of append-only input logs.

use crate::cursor::CursorStore;
use crate::error::{CoreError, CoreResult};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

/// Reads the lines appended to a file since the previous read.
///
/// The tailer owns the [`CursorStore`]. A successful read advances the
/// cursor to the end of what was read; a failed read leaves it where it
/// was, so the next attempt starts from the same offset.
///
/// Truncation is not detected: if a file shrinks below its cursor, reads
/// return nothing until it grows past the old offset again.
#[derive(Debug, Default)]
pub struct Tailer {
    cursors: CursorStore,
}

impl Tailer {
    /// Creates a tailer with no known files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cursor store.
    #[must_use]
    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    /// Reads new lines from `path`, advancing its cursor.
    ///
    /// Lines keep their terminators. A trailing fragment without a newline
    /// is returned as a line of its own.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Read`] if the file cannot be opened, positioned
    /// or read. The failure is logged and the cursor is unchanged, so callers
    /// treat it as an empty read and retry on the next event.
    pub fn read(&self, path: &Path) -> CoreResult<Vec<String>> {
        self.read_new(path)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "input log read failed"))
    }

    fn read_new(&self, path: &Path) -> CoreResult<Vec<String>> {
        let offset = self.cursors.get(path).unwrap_or(0);

        let mut file = File::open(path).map_err(|e| CoreError::read(path, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| CoreError::read(path, e))?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|e| CoreError::read(path, e))?;

        let end = offset + buffer.len() as u64;
        self.cursors.set(path, end);

        let lines = split_lines(&buffer);
        debug!(
            path = %path.display(),
            from = offset,
            to = end,
            lines = lines.len(),
            "read input log"
        );
        Ok(lines)
    }

    /// Forgets the cursor of a deleted file.
    pub fn forget(&self, path: &Path) -> Option<u64> {
        self.cursors.remove(path)
    }
}

/// Splits raw bytes into lines, keeping each `\n` terminator.
///
/// Invalid UTF-8 is replaced rather than rejected.
#[must_use]
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split_inclusive('\n')
        .map(str::to_owned)
        .collect()
}
