//! Filesystem notifications for the watched directory.
//!
//! A `notify` watcher pushes raw events into a channel; one worker thread
//! translates them into [`FsEvent`]s and hands them to the [`Dispatcher`]
//! in arrival order.

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tailsort_core::{Dispatcher, FsEvent};
use thiserror::Error;
use tracing::{debug, warn};

/// How often the worker checks for shutdown while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Errors raised while installing the watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The notification backend failed.
    #[error("filesystem watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The worker thread could not be spawned.
    #[error("failed to spawn watcher thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A running watcher.
///
/// Dropping it drops the `notify` watcher and with it the event sender, so
/// the worker ends once the channel disconnects. The drop does not wait for
/// that; use [`WatchHandle::stop`] to join the worker.
pub struct WatchHandle {
    watcher: RecommendedWatcher,
    shutdown: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl WatchHandle {
    /// Stops delivering events and waits for the worker to finish the event
    /// it is currently handling.
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        drop(self.watcher);
        if self.worker.join().is_err() {
            warn!("watcher thread panicked");
        }
    }
}

/// Watches `dir` (non-recursively) and feeds its events to `dispatcher`.
///
/// Events for any path in `ignored` are dropped, which keeps the output log
/// from being tailed when it lives inside the watched directory.
pub fn start(
    dir: &Path,
    dispatcher: Dispatcher,
    ignored: Vec<PathBuf>,
) -> Result<WatchHandle, WatchError> {
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let stop = Arc::clone(&shutdown);

    let worker = thread::Builder::new()
        .name("tailsort-watcher".into())
        .spawn(move || loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    for fs_event in translate(&event) {
                        if ignored.contains(&fs_event.path) {
                            continue;
                        }
                        let outcome = dispatcher.dispatch(&fs_event);
                        debug!(?fs_event, ?outcome, "handled event");
                    }
                }
                Ok(Err(e)) => warn!(error = %e, "filesystem watcher error"),
                Err(RecvTimeoutError::Timeout) => {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;

    Ok(WatchHandle {
        watcher,
        shutdown,
        worker,
    })
}

/// Maps a `notify` event onto created/modified/deleted events.
///
/// A rename becomes a deletion of the old name and a creation of the new
/// one. Access and unclassified events produce nothing.
fn translate(event: &Event) -> Vec<FsEvent> {
    match &event.kind {
        EventKind::Create(_) => event.paths.iter().map(FsEvent::created).collect(),
        EventKind::Remove(_) => event.paths.iter().map(FsEvent::deleted).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event.paths.iter().map(FsEvent::deleted).collect(),
            RenameMode::To => event.paths.iter().map(FsEvent::created).collect(),
            RenameMode::Both => match event.paths.as_slice() {
                [from, to] => vec![FsEvent::deleted(from), FsEvent::created(to)],
                _ => Vec::new(),
            },
            _ => event
                .paths
                .iter()
                .map(|path| {
                    if path.exists() {
                        FsEvent::created(path)
                    } else {
                        FsEvent::deleted(path)
                    }
                })
                .collect(),
        },
        EventKind::Modify(_) => event.paths.iter().map(FsEvent::modified).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}
