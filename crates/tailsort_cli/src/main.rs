//! Tailsort CLI
//!
//! Watches a directory of append-only logs and periodically appends the new
//! lines, ordered by their `<number>` key, to one consolidated log.
//!
//! ```text
//! tailsort /var/log/nginx --interval 30
//! ```

mod watcher;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tailsort_core::{Config, Dispatcher, KeyPolicy, LogProcessor, DEFAULT_OUTPUT_FILE};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Merge appended log lines into one key-sorted log.
#[derive(Parser)]
#[command(name = "tailsort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to watch (created if missing)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Seconds between flushes
    #[arg(short, long, default_value_t = 10)]
    interval: u64,

    /// Output log (defaults to processed_output.log in the working directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail the whole flush when a line has no <number> key
    #[arg(long)]
    strict_keys: bool,

    /// Drop buffered lines on interrupt instead of flushing them
    #[arg(long)]
    no_final_flush: bool,

    /// Fsync the output log after every flush
    #[arg(long)]
    sync: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self, output: PathBuf) -> Config {
        let policy = if self.strict_keys {
            KeyPolicy::Strict
        } else {
            KeyPolicy::Skip
        };
        Config::new()
            .flush_interval(Duration::from_secs(self.interval))
            .output_path(output)
            .key_policy(policy)
            .flush_on_shutdown(!self.no_final_flush)
            .sync_on_flush(self.sync)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !cli.dir.exists() {
        std::fs::create_dir_all(&cli.dir)?;
        info!("Created watch directory {:?}", cli.dir);
    }
    let dir = cli.dir.canonicalize()?;

    let output = absolute(
        cli.output
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_OUTPUT_FILE)),
    )?;

    let processor = Arc::new(LogProcessor::open(cli.config(output.clone()))?);
    let dispatcher = Dispatcher::new(Arc::clone(&processor));
    let handle = watcher::start(&dir, dispatcher, vec![output.clone()])?;

    info!(
        dir = %dir.display(),
        output = %output.display(),
        interval_secs = cli.interval,
        "watching for log changes"
    );

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, stopping watcher");

    tokio::task::spawn_blocking(move || handle.stop()).await?;
    processor.shutdown();

    let stats = processor.stats();
    info!(
        lines_read = stats.lines_read,
        lines_written = stats.lines_written,
        flushes = stats.flushes,
        flush_failures = stats.flush_failures,
        read_errors = stats.read_errors,
        malformed_lines = stats.malformed_lines,
        "stopped"
    );

    Ok(())
}

/// Resolves `path` against the working directory, canonicalizing the parent
/// so it compares equal to the paths the watcher reports.
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    let joined = std::env::current_dir()?.join(path);
    match (joined.parent(), joined.file_name()) {
        (Some(parent), Some(name)) if parent.exists() => Ok(parent.canonicalize()?.join(name)),
        _ => Ok(joined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["tailsort"]);
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.interval, 10);
        assert!(cli.output.is_none());

        let config = cli.config(PathBuf::from("out.log"));
        assert_eq!(config.flush_interval, Duration::from_secs(10));
        assert_eq!(config.key_policy, KeyPolicy::Skip);
        assert!(config.flush_on_shutdown);
        assert!(!config.sync_on_flush);
    }

    #[test]
    fn flags_map_to_config() {
        let cli = Cli::parse_from([
            "tailsort",
            "/var/log/nginx",
            "--interval",
            "30",
            "--output",
            "merged.log",
            "--strict-keys",
            "--no-final-flush",
            "--sync",
        ]);
        assert_eq!(cli.dir, PathBuf::from("/var/log/nginx"));
        assert_eq!(cli.output, Some(PathBuf::from("merged.log")));

        let config = cli.config(PathBuf::from("merged.log"));
        assert_eq!(config.flush_interval, Duration::from_secs(30));
        assert_eq!(config.key_policy, KeyPolicy::Strict);
        assert!(!config.flush_on_shutdown);
        assert!(config.sync_on_flush);
    }

    #[test]
    fn absolute_keeps_file_name() {
        let resolved = absolute(Path::new("some_output.log")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved.file_name().unwrap(), "some_output.log");
    }
}
