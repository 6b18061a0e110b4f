//! Aggregate timing for pipeline runs.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;

/// Accumulated timings for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BenchStat {
    pub count: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub total: Duration,
}

/// Timings aggregated by label across every document.
///
/// Shared between concurrent runs; each measurement only touches the lock
/// when it finishes.
#[derive(Debug, Default)]
pub struct Aggregate {
    stats: Mutex<IndexMap<String, BenchStat>>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring under `label`.
    pub fn before(&self, label: impl Into<String>) -> Measurement<'_> {
        Measurement {
            aggregate: self,
            label: label.into(),
            started: Instant::now(),
        }
    }

    /// Stats recorded under a label so far.
    pub fn get(&self, label: &str) -> Option<BenchStat> {
        self.lock().get(label).copied()
    }

    /// All labels in first-recorded order.
    pub fn snapshot(&self) -> Vec<(String, BenchStat)> {
        self.lock()
            .iter()
            .map(|(label, stat)| (label.clone(), *stat))
            .collect()
    }

    fn record(&self, label: String, elapsed: Duration) {
        let mut stats = self.lock();
        let stat = stats.entry(label).or_default();
        stat.count += 1;
        stat.total += elapsed;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, BenchStat>> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An in-flight measurement.
///
/// Nothing is recorded if the measurement is dropped without calling
/// [`Measurement::after`], e.g. when the measured work failed.
#[must_use = "call `after` to record the measurement"]
pub struct Measurement<'a> {
    aggregate: &'a Aggregate,
    label: String,
    started: Instant,
}

impl Measurement<'_> {
    /// Stop measuring and record the elapsed time.
    pub fn after(self) {
        let elapsed = self.started.elapsed();
        tracing::trace!(label = %self.label, ?elapsed, "measurement finished");
        self.aggregate.record(self.label, elapsed);
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64() * 1000.0)
}
