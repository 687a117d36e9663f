//! Process-wide named counters.

use dashmap::DashMap;

/// Counter tracking every successfully decoded comm request.
pub const TOTAL: &str = "total";

/// Counter tracking suppressed duplicates.
pub const DROPPED: &str = "dropped";

/// Thread-safe named integer counters.
///
/// Values never decrease and live for the process lifetime. The increment
/// path holds the key's entry lock across the read-modify-write, so no update
/// is lost under concurrent load.
#[derive(Default)]
pub struct CounterStore {
    counts: DashMap<String, i64>,
}

impl CounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the count for `name`, optionally incrementing it first.
    ///
    /// A counter that has never been set reads as 0; incrementing it yields 1.
    pub fn hit_count(&self, name: &str, increment: bool) -> i64 {
        if increment {
            let mut entry = self.counts.entry(name.to_string()).or_insert(0);
            *entry += 1;
            *entry
        } else {
            self.counts.get(name).map(|value| *value).unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn absent_counter_reads_zero() {
        let store = CounterStore::new();
        assert_eq!(store.hit_count("missing", false), 0);
        // Reading must not create the counter.
        assert_eq!(store.hit_count("missing", false), 0);
    }

    #[test]
    fn increment_returns_new_value() {
        let store = CounterStore::new();
        assert_eq!(store.hit_count("x", true), 1);
        assert_eq!(store.hit_count("x", true), 2);
        assert_eq!(store.hit_count("x", false), 2);
    }

    #[test]
    fn counters_are_independent() {
        let store = CounterStore::new();
        store.hit_count("a", true);
        store.hit_count("a", true);
        store.hit_count("b", true);

        assert_eq!(store.hit_count("a", false), 2);
        assert_eq!(store.hit_count("b", false), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_increments_lose_nothing() {
        let store = Arc::new(CounterStore::new());

        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.hit_count("x", true) })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.hit_count("x", false), 100);
    }
}
