//! # Tailsort Storage
//!
//! Output sinks for the consolidated log written by tailsort.
//!
//! A sink is an **append-only byte stream**. It never interprets what it
//! stores and never rewrites data it has already accepted: every successful
//! `append` lands after everything written before it.
//!
//! ## Available Sinks
//!
//! - [`FileSink`] - Appends to a file on disk, reopening it for every write
//! - [`InMemorySink`] - For tests, with switchable write failures
//!
//! ## Example
//!
//! ```rust
//! use tailsort_storage::{LogSink, InMemorySink};
//!
//! let sink = InMemorySink::new();
//! let offset = sink.append(b"event<1.0>\n").unwrap();
//! assert_eq!(offset, 0);
//! assert_eq!(sink.data(), b"event<1.0>\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod sink;

pub use error::{SinkError, SinkResult};
pub use file::FileSink;
pub use memory::InMemorySink;
pub use sink::LogSink;
