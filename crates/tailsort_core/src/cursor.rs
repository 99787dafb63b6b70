//! Per-file read cursors.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maps each input log to the byte offset already consumed from it.
///
/// Cursors live only as long as the process: nothing is persisted, so a
/// restart reads every file again from offset 0.
///
/// # Invariants
///
/// - An entry is created on the first successful read of a path
/// - An entry is removed only when the path is reported deleted
/// - Between deletions an offset never decreases
/// - Cursors of different paths are independent
#[derive(Debug, Default)]
pub struct CursorStore {
    offsets: RwLock<HashMap<PathBuf, u64>>,
}

impl CursorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored offset for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<u64> {
        self.offsets.read().get(path).copied()
    }

    /// Records `offset` as the consumed position of `path`.
    ///
    /// An offset lower than the stored one is ignored: files are treated as
    /// append-only and the cursor only moves forward.
    pub fn set(&self, path: &Path, offset: u64) {
        let mut offsets = self.offsets.write();
        match offsets.get_mut(path) {
            Some(current) if *current > offset => {
                debug!(
                    path = %path.display(),
                    current = *current,
                    requested = offset,
                    "ignoring backwards cursor move"
                );
            }
            Some(current) => *current = offset,
            None => {
                offsets.insert(path.to_path_buf(), offset);
            }
        }
    }

    /// Forgets the cursor for `path`, returning the last offset.
    pub fn remove(&self, path: &Path) -> Option<u64> {
        self.offsets.write().remove(path)
    }

    /// Returns the number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.read().len()
    }

    /// Returns true if no path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.read().is_empty()
    }
}
