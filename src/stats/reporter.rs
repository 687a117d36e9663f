//! Periodic request statistics summary.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::dedup::counters::{CounterStore, DROPPED, TOTAL};

/// Background loop logging one dropped/total summary line per interval.
pub struct StatsReporter {
    counters: Arc<CounterStore>,
    interval: Duration,
}

impl StatsReporter {
    /// Create a reporter reading from the shared counter store.
    pub fn new(counters: Arc<CounterStore>, interval: Duration) -> Self {
        Self { counters, interval }
    }

    /// Run until the shutdown signal fires.
    ///
    /// The inter-tick wait is bounded by the interval and the shutdown branch
    /// of the select, so cancellation takes effect within one interval.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "stats reporter starting"
        );

        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report();
                }
                _ = shutdown.recv() => {
                    tracing::info!("stats reporter received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn report(&self) {
        let total = self.counters.hit_count(TOTAL, false);
        let dropped = self.counters.hit_count(DROPPED, false);
        let percent = if total > 0 {
            dropped as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        tracing::info!("{} of {} requests dropped ({:.2}%)", dropped, total, percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let counters = Arc::new(CounterStore::new());
        let reporter = StatsReporter::new(counters, Duration::from_secs(60));

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(reporter.run(rx));

        tx.send(()).unwrap();

        // The loop must exit well within the interval once signalled.
        timeout(Duration::from_secs(1), handle)
            .await
            .expect("reporter did not stop after shutdown")
            .unwrap();
    }
}
