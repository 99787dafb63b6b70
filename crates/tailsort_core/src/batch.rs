//! Lines buffered between flushes.

use parking_lot::Mutex;

/// An append-only buffer of raw lines awaiting the next flush.
///
/// Insertion order carries no meaning; the batch is re-sorted before it is
/// written. [`BatchCache::drain`] swaps the buffer out under the same lock
/// that guards [`BatchCache::append`], so every line ends up in exactly one
/// drained batch.
#[derive(Debug, Default)]
pub struct BatchCache {
    lines: Mutex<Vec<String>>,
}

impl BatchCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds lines to the cache.
    pub fn append<I>(&self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines.lock().extend(lines);
    }

    /// Takes every buffered line and leaves the cache empty.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    /// Puts lines from a failed flush back in front of newer ones.
    pub fn restore(&self, mut lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let mut current = self.lines.lock();
        lines.append(&mut current);
        *current = lines;
    }

    /// Returns the number of buffered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn drain_empties_the_cache() {
        let cache = BatchCache::new();
        cache.append(owned(&["a<1>\n", "b<2>\n"]));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.drain(), owned(&["a<1>\n", "b<2>\n"]));
        assert!(cache.is_empty());
        assert!(cache.drain().is_empty());
    }

    #[test]
    fn restore_goes_before_newer_lines() {
        let cache = BatchCache::new();
        cache.append(owned(&["old<1>\n"]));
        let taken = cache.drain();
        cache.append(owned(&["new<2>\n"]));

        cache.restore(taken);
        assert_eq!(cache.drain(), owned(&["old<1>\n", "new<2>\n"]));
    }

    #[test]
    fn concurrent_appends_and_drains_lose_nothing() {
        let cache = Arc::new(BatchCache::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        cache.append(vec![format!("w{w}-{i}<{i}>\n")]);
                    }
                })
            })
            .collect();

        let drainer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut collected = Vec::new();
                for _ in 0..200 {
                    collected.extend(cache.drain());
                    thread::yield_now();
                }
                collected
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        let mut all = drainer.join().unwrap();
        all.extend(cache.drain());

        let mut counts: HashMap<String, usize> = HashMap::new();
        for line in all {
            *counts.entry(line).or_default() += 1;
        }
        assert_eq!(counts.len(), 2000);
        assert!(counts.values().all(|&n| n == 1));
    }

    proptest! {
        #[test]
        fn every_line_lands_in_one_drain(
            ops in prop::collection::vec(prop::option::of(prop::collection::vec("[a-z]{1,6}", 0..5)), 0..40)
        ) {
            // Some(lines) appends, None drains.
            let cache = BatchCache::new();
            let mut appended = Vec::new();
            let mut drained = Vec::new();
            for op in ops {
                match op {
                    Some(lines) => {
                        appended.extend(lines.iter().cloned());
                        cache.append(lines);
                    }
                    None => drained.extend(cache.drain()),
                }
            }
            drained.extend(cache.drain());
            prop_assert_eq!(drained, appended);
        }
    }
}
