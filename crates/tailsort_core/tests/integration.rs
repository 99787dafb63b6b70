//! End-to-end tests driving the dispatcher the way the watcher does.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tailsort_core::{Config, DispatchOutcome, Dispatcher, FsEvent, LogProcessor, Tailer};
use tailsort_storage::InMemorySink;
use tempfile::tempdir;

const INTERVAL: Duration = Duration::from_secs(10);

fn append(path: &Path, data: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(data.as_bytes()).unwrap();
}

fn setup(start: Instant) -> (Dispatcher, Arc<InMemorySink>) {
    let sink = Arc::new(InMemorySink::new());
    let config = Config::new().flush_interval(INTERVAL);
    let processor = LogProcessor::with_sink_at(config, sink.clone(), start).unwrap();
    (Dispatcher::new(Arc::new(processor)), sink)
}

#[test]
fn lines_in_one_batch_are_reordered() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let start = Instant::now();
    let (dispatcher, sink) = setup(start);

    append(&path, "event<2.0>\n");
    dispatcher.dispatch_at(&FsEvent::created(&path), start + Duration::from_secs(1));

    append(&path, "event<1.0>\n");
    let outcome = dispatcher.dispatch_at(&FsEvent::modified(&path), start + Duration::from_secs(11));

    assert!(matches!(
        outcome,
        DispatchOutcome::Processed(p) if p.flushed && p.lines == 1
    ));
    assert_eq!(sink.lines(), vec!["event<1.0>\n", "event<2.0>\n"]);
}

#[test]
fn separate_batches_are_appended_in_flush_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let start = Instant::now();
    let (dispatcher, sink) = setup(start);

    append(&path, "event<2.0>\n");
    let first = start + Duration::from_secs(11);
    dispatcher.dispatch_at(&FsEvent::created(&path), first);
    assert_eq!(sink.lines(), vec!["event<2.0>\n"]);

    append(&path, "event<1.0>\n");
    dispatcher.dispatch_at(&FsEvent::modified(&path), first + Duration::from_secs(1));
    assert_eq!(sink.lines(), vec!["event<2.0>\n"]);

    dispatcher.dispatch_at(&FsEvent::modified(&path), first + Duration::from_secs(11));
    assert_eq!(sink.lines(), vec!["event<2.0>\n", "event<1.0>\n"]);
}

#[test]
fn lines_from_several_files_are_merged() {
    let dir = tempdir().unwrap();
    let web = dir.path().join("web.log");
    let db = dir.path().join("db.log");
    let start = Instant::now();
    let (dispatcher, sink) = setup(start);

    append(&web, "web <3> GET /\nweb <1> GET /login\n");
    append(&db, "db <2> SELECT\n");

    dispatcher.dispatch_at(&FsEvent::created(&web), start);
    dispatcher.dispatch_at(&FsEvent::created(&db), start + Duration::from_secs(11));

    assert_eq!(
        sink.lines(),
        vec!["web <1> GET /login\n", "db <2> SELECT\n", "web <3> GET /\n"]
    );
}

#[test]
fn deletion_resets_cursor_to_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let start = Instant::now();
    let (dispatcher, sink) = setup(start);

    append(&path, "old<1>\nold<2>\n");
    dispatcher.dispatch_at(&FsEvent::created(&path), start);
    assert_eq!(dispatcher.processor().cursor(&path), Some(14));

    std::fs::remove_file(&path).unwrap();
    dispatcher.dispatch_at(&FsEvent::deleted(&path), start);
    assert_eq!(dispatcher.processor().cursor(&path), None);

    append(&path, "new<3>\n");
    dispatcher.dispatch_at(&FsEvent::created(&path), start + Duration::from_secs(11));

    assert_eq!(sink.lines(), vec!["old<1>\n", "old<2>\n", "new<3>\n"]);
}

#[test]
fn failed_read_is_retried_from_same_offset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let parked = dir.path().join("app.log.parked");

    let tailer = Tailer::new();
    append(&path, "a<1>\n");
    assert_eq!(tailer.read(&path).unwrap(), vec!["a<1>\n"]);

    append(&path, "b<2>\nc<3>\n");
    std::fs::rename(&path, &parked).unwrap();
    assert!(tailer.read(&path).is_err());
    assert_eq!(tailer.cursors().get(&path), Some(5));

    std::fs::rename(&parked, &path).unwrap();
    assert_eq!(tailer.read(&path).unwrap(), vec!["b<2>\n", "c<3>\n"]);
}

#[test]
fn unflushed_lines_go_out_on_shutdown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let start = Instant::now();
    let (dispatcher, sink) = setup(start);

    append(&path, "b<2>\na<1>\n");
    dispatcher.dispatch_at(&FsEvent::created(&path), start);
    assert!(sink.data().is_empty());

    assert!(dispatcher.processor().shutdown());
    assert_eq!(sink.lines(), vec!["a<1>\n", "b<2>\n"]);
}

#[test]
fn concurrent_delivery_loses_and_duplicates_nothing() {
    let dir = tempdir().unwrap();
    let sink = Arc::new(InMemorySink::new());
    let config = Config::new().flush_interval(Duration::from_millis(1));
    let processor = Arc::new(LogProcessor::with_sink(config, sink.clone()).unwrap());
    let dispatcher = Dispatcher::new(Arc::clone(&processor));

    let files: Vec<_> = (0..4).map(|i| dir.path().join(format!("f{i}.log"))).collect();

    let handles: Vec<_> = files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let path = path.clone();
            let dispatcher = dispatcher.clone();
            thread::spawn(move || {
                for n in 0..100 {
                    append(&path, &format!("f{i} <{}>\n", n * 4 + i));
                    dispatcher.dispatch(&FsEvent::modified(&path));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    processor.flush_now();

    let mut lines = sink.lines();
    assert_eq!(lines.len(), 400);
    lines.sort();
    lines.dedup();
    assert_eq!(lines.len(), 400);
    assert_eq!(processor.stats().lines_written, 400);
}
