//! Sort key extraction and batch ordering.

use crate::config::KeyPolicy;
use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// `<number>` with an optional sign, fraction and exponent.
static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)\s*>")
        .expect("key pattern should compile")
});

/// Extracts the numeric key of a line.
///
/// The key is the first angle-bracketed group that parses as a decimal
/// number, e.g. `1487610123.45` in `GET / <1487610123.45> 200`.
#[must_use]
pub fn sort_key(line: &str) -> Option<f64> {
    KEY_PATTERN
        .captures_iter(line)
        .find_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
}

/// A batch ready to be written.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderedBatch {
    /// Lines in ascending key order.
    pub lines: Vec<String>,
    /// Lines dropped because they had no key.
    pub skipped: Vec<String>,
}

/// Orders `batch` ascending by [`sort_key`].
///
/// The sort is stable: lines with equal keys keep their relative order.
///
/// # Errors
///
/// With [`KeyPolicy::Strict`], returns [`CoreError::MissingSortKey`] for the
/// first line without a key. With [`KeyPolicy::Skip`] such lines are moved to
/// [`OrderedBatch::skipped`] instead.
pub fn order_batch(batch: Vec<String>, policy: KeyPolicy) -> CoreResult<OrderedBatch> {
    let mut keyed = Vec::with_capacity(batch.len());
    let mut skipped = Vec::new();

    for line in batch {
        match sort_key(&line) {
            Some(key) => keyed.push((key, line)),
            None => match policy {
                KeyPolicy::Strict => return Err(CoreError::missing_sort_key(line)),
                KeyPolicy::Skip => {
                    warn!(line = %line.trim_end(), "skipping line without sort key");
                    skipped.push(line);
                }
            },
        }
    }

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(OrderedBatch {
        lines: keyed.into_iter().map(|(_, line)| line).collect(),
        skipped,
    })
}
