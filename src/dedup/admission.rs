//! Admission filtering for discardable record types.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::DedupConfig;
use crate::dedup::counters::{self, CounterStore};
use crate::dedup::record::GameRecord;

/// Outcome of classifying a decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Deliver the request to the upstream.
    Forward,
    /// Acknowledge the client without contacting the upstream.
    Drop,
}

/// Last payload seen for a record type, live until `expires_at`.
struct LastSeen {
    payload: String,
    expires_at: Instant,
}

/// Per-type duplicate suppression with lazily-expiring memory.
///
/// One instance is built at startup and shared by handle across all request
/// handlers. The check-then-write on a type's cache entry happens under that
/// key's entry lock, so racing requests of the same type classify against a
/// consistent entry and the stored value is always exactly one of the writes.
pub struct AdmissionFilter {
    discard_types: HashSet<String>,
    window: Duration,
    last_seen: DashMap<String, LastSeen>,
    counters: Arc<CounterStore>,
}

impl AdmissionFilter {
    /// Build a filter from config.
    pub fn new(config: &DedupConfig, counters: Arc<CounterStore>) -> Self {
        Self::with_window(
            config.discard_types.iter().cloned(),
            Duration::from_secs(config.window_secs),
            counters,
        )
    }

    /// Build a filter with an explicit suppression window.
    pub fn with_window(
        discard_types: impl IntoIterator<Item = String>,
        window: Duration,
        counters: Arc<CounterStore>,
    ) -> Self {
        Self {
            discard_types: discard_types.into_iter().collect(),
            window,
            last_seen: DashMap::new(),
            counters,
        }
    }

    /// Classify a decoded record as forwardable or a suppressible duplicate.
    ///
    /// Every call counts toward `total`. A `Drop` additionally counts toward
    /// `dropped`. Non-discardable types never touch the last-seen cache.
    pub fn classify(&self, record: &GameRecord) -> Decision {
        self.counters.hit_count(counters::TOTAL, true);

        if !self.discard_types.contains(&record.record_type) {
            return Decision::Forward;
        }

        let now = Instant::now();
        let decision = match self.last_seen.entry(record.record_type.clone()) {
            Entry::Occupied(mut entry) => {
                let live = now <= entry.get().expires_at;
                if !record.payload.is_empty() && live && record.payload == entry.get().payload {
                    Decision::Drop
                } else {
                    entry.insert(self.fresh_entry(record, now));
                    Decision::Forward
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(self.fresh_entry(record, now));
                Decision::Forward
            }
        };

        if decision == Decision::Drop {
            self.counters.hit_count(counters::DROPPED, true);
        }

        decision
    }

    fn fresh_entry(&self, record: &GameRecord, now: Instant) -> LastSeen {
        LastSeen {
            payload: record.payload.clone(),
            expires_at: now + self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::counters::{DROPPED, TOTAL};
    use std::thread;

    fn record(record_type: &str, payload: &str) -> GameRecord {
        GameRecord {
            record_type: record_type.to_string(),
            field2: "a".to_string(),
            field3: "b".to_string(),
            payload: payload.to_string(),
        }
    }

    fn filter_with_window(window: Duration) -> (AdmissionFilter, Arc<CounterStore>) {
        let counters = Arc::new(CounterStore::new());
        let filter = AdmissionFilter::with_window(
            ["infonpc".to_string()],
            window,
            counters.clone(),
        );
        (filter, counters)
    }

    fn filter() -> (AdmissionFilter, Arc<CounterStore>) {
        filter_with_window(Duration::from_secs(10))
    }

    #[test]
    fn duplicate_within_window_is_dropped() {
        let (filter, counters) = filter();

        assert_eq!(filter.classify(&record("infonpc", "HP:100")), Decision::Forward);
        assert_eq!(filter.classify(&record("infonpc", "HP:100")), Decision::Drop);

        assert_eq!(counters.hit_count(TOTAL, false), 2);
        assert_eq!(counters.hit_count(DROPPED, false), 1);
    }

    #[test]
    fn changed_payload_is_forwarded_and_cached() {
        let (filter, _) = filter();

        filter.classify(&record("infonpc", "HP:100"));
        assert_eq!(filter.classify(&record("infonpc", "HP:90")), Decision::Forward);
        // The new payload replaced the cached one.
        assert_eq!(filter.classify(&record("infonpc", "HP:90")), Decision::Drop);
        assert_eq!(filter.classify(&record("infonpc", "HP:100")), Decision::Forward);
    }

    #[test]
    fn comparison_is_exact() {
        let (filter, _) = filter();

        filter.classify(&record("infonpc", "HP:100"));
        assert_eq!(filter.classify(&record("infonpc", "hp:100")), Decision::Forward);
        assert_eq!(filter.classify(&record("infonpc", " hp:100 ")), Decision::Forward);
    }

    #[test]
    fn empty_payload_always_forwards() {
        let (filter, _) = filter();

        filter.classify(&record("infonpc", "HP:100"));
        assert_eq!(filter.classify(&record("infonpc", "")), Decision::Forward);
        assert_eq!(filter.classify(&record("infonpc", "")), Decision::Forward);
    }

    #[test]
    fn non_discardable_types_never_drop() {
        let (filter, counters) = filter();

        assert_eq!(filter.classify(&record("chat", "hello")), Decision::Forward);
        assert_eq!(filter.classify(&record("chat", "hello")), Decision::Forward);

        assert_eq!(counters.hit_count(TOTAL, false), 2);
        assert_eq!(counters.hit_count(DROPPED, false), 0);
    }

    #[test]
    fn types_are_isolated() {
        let counters = Arc::new(CounterStore::new());
        let filter = AdmissionFilter::with_window(
            ["infonpc".to_string(), "infoloc".to_string()],
            Duration::from_secs(10),
            counters,
        );

        filter.classify(&record("infonpc", "same"));
        // Same payload under a different type is not a duplicate.
        assert_eq!(filter.classify(&record("infoloc", "same")), Decision::Forward);
        assert_eq!(filter.classify(&record("infonpc", "same")), Decision::Drop);
    }

    #[test]
    fn expired_entry_is_treated_as_absent() {
        let (filter, _) = filter_with_window(Duration::from_millis(30));

        filter.classify(&record("infonpc", "HP:100"));
        thread::sleep(Duration::from_millis(60));

        assert_eq!(filter.classify(&record("infonpc", "HP:100")), Decision::Forward);
        // The forward refreshed the window.
        assert_eq!(filter.classify(&record("infonpc", "HP:100")), Decision::Drop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn racing_same_type_requests_never_corrupt_counters() {
        let (filter, counters) = filter();
        let filter = Arc::new(filter);

        filter.classify(&record("infonpc", "HP:100"));

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let filter = filter.clone();
                tokio::spawn(async move { filter.classify(&record("infonpc", "HP:100")) })
            })
            .collect();

        let mut dropped = 0;
        for task in tasks {
            if task.await.unwrap() == Decision::Drop {
                dropped += 1;
            }
        }

        assert_eq!(dropped, 50);
        assert_eq!(counters.hit_count(TOTAL, false), 51);
        assert_eq!(counters.hit_count(DROPPED, false), 50);
    }
}
