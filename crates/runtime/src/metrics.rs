use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Clone, Default)]
pub struct RunMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    records_read: AtomicU64,
    events_ingested: AtomicU64,
    events_skipped: AtomicU64,
    customers: AtomicU64,
    results_written: AtomicU64,
}

impl RunMetrics {
    pub fn inc_records_read(&self, delta: u64) {
        self.inner.records_read.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_events_ingested(&self, delta: u64) {
        self.inner.events_ingested.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_events_skipped(&self, delta: u64) {
        self.inner.events_skipped.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn record_customers(&self, customers: u64) {
        self.inner.customers.store(customers, Ordering::Relaxed);
    }

    pub fn inc_results_written(&self, delta: u64) {
        self.inner.results_written.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.inner.records_read.load(Ordering::Relaxed),
            events_ingested: self.inner.events_ingested.load(Ordering::Relaxed),
            events_skipped: self.inner.events_skipped.load(Ordering::Relaxed),
            customers: self.inner.customers.load(Ordering::Relaxed),
            results_written: self.inner.results_written.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub events_ingested: u64,
    pub events_skipped: u64,
    pub customers: u64,
    pub results_written: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            label: &'a str,
            #[serde(flatten)]
            counters: &'a MetricsSnapshot,
            elapsed_ms: Option<u128>,
        }

        let payload = Snapshot {
            label,
            counters: self,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct PhaseTimer {
    start: Instant,
}

impl PhaseTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
