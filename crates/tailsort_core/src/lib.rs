//! # Tailsort Core
//!
//! Incremental log tailing with time-windowed, key-sorted flushing.
//!
//! This crate provides:
//! - A cursor store remembering how far each input file has been read
//! - A tailer that returns only the lines appended since the last read
//! - A batch cache collecting lines between flushes
//! - A flush schedule deciding when the batch is due
//! - A flusher that orders the batch by its `<number>` key and appends it
//!   to the output log
//! - A dispatcher mapping created/modified/deleted events onto the above
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use tailsort_core::{Config, Dispatcher, FsEvent, LogProcessor};
//! use tailsort_storage::InMemorySink;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let input = dir.path().join("app.log");
//! std::fs::write(&input, "b<2.0>\na<1.0>\n").unwrap();
//!
//! let sink = Arc::new(InMemorySink::new());
//! let start = Instant::now();
//! let config = Config::new().flush_interval(Duration::from_secs(10));
//! let processor = Arc::new(LogProcessor::with_sink_at(config, sink.clone(), start).unwrap());
//! let dispatcher = Dispatcher::new(Arc::clone(&processor));
//!
//! dispatcher.dispatch_at(&FsEvent::modified(&input), start + Duration::from_secs(11));
//! assert_eq!(sink.lines(), vec!["a<1.0>\n", "b<2.0>\n"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod cursor;
mod dispatcher;
mod error;
mod flusher;
mod key;
mod processor;
mod schedule;
mod stats;
mod tailer;

pub use batch::BatchCache;
pub use config::{Config, KeyPolicy, DEFAULT_FLUSH_INTERVAL, DEFAULT_OUTPUT_FILE};
pub use cursor::CursorStore;
pub use dispatcher::{DispatchOutcome, Dispatcher, FsEvent, FsEventKind};
pub use error::{CoreError, CoreResult};
pub use flusher::{FlushFailure, FlushReport, Flusher};
pub use key::{order_batch, sort_key, OrderedBatch};
pub use processor::{LogProcessor, ProcessOutcome};
pub use schedule::{is_due, FlushSchedule};
pub use stats::{ProcessorStats, StatsSnapshot};
pub use tailer::{split_lines, Tailer};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
