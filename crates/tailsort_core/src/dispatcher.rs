//! Routing of filesystem events to the processor.

use crate::processor::{LogProcessor, ProcessOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsEventKind {
    /// A file appeared.
    Created,
    /// A file's content changed.
    Modified,
    /// A file was removed.
    Deleted,
}

/// A filesystem change reported by the notification layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    /// What happened.
    pub kind: FsEventKind,
    /// The affected path.
    pub path: PathBuf,
}

impl FsEvent {
    /// Creates an event.
    pub fn new(kind: FsEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Creates a `Created` event.
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::Created, path)
    }

    /// Creates a `Modified` event.
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::Modified, path)
    }

    /// Creates a `Deleted` event.
    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::Deleted, path)
    }
}

/// What the dispatcher did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The file was tailed.
    Processed(ProcessOutcome),
    /// The path is not a regular file.
    Ignored,
    /// The cursor was dropped; holds the offset it had, if any.
    Forgotten(Option<u64>),
}

/// Maps created/modified/deleted events onto a [`LogProcessor`].
///
/// - `Created` / `Modified` on a regular file: tail it, buffer the lines and
///   flush if due
/// - `Deleted`: forget the file's cursor, without flushing
#[derive(Debug, Clone)]
pub struct Dispatcher {
    processor: Arc<LogProcessor>,
}

impl Dispatcher {
    /// Creates a dispatcher for `processor`.
    pub fn new(processor: Arc<LogProcessor>) -> Self {
        Self { processor }
    }

    /// Returns the processor.
    #[must_use]
    pub fn processor(&self) -> &Arc<LogProcessor> {
        &self.processor
    }

    /// Handles one event.
    pub fn dispatch(&self, event: &FsEvent) -> DispatchOutcome {
        self.dispatch_at(event, Instant::now())
    }

    /// Handles one event with an explicit clock reading.
    pub fn dispatch_at(&self, event: &FsEvent, now: Instant) -> DispatchOutcome {
        trace!(kind = ?event.kind, path = %event.path.display(), "dispatching event");
        match event.kind {
            FsEventKind::Created | FsEventKind::Modified => {
                if is_regular_file(&event.path) {
                    DispatchOutcome::Processed(self.processor.process_log_at(&event.path, now))
                } else {
                    DispatchOutcome::Ignored
                }
            }
            FsEventKind::Deleted => {
                DispatchOutcome::Forgotten(self.processor.remove_input_log(&event.path))
            }
        }
    }
}

fn is_regular_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
