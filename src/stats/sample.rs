//! Periodic hit-rate sampling

use std::time::{Duration, Instant};

use serde::Serialize;

/// Default number of acquisitions between samples
pub const DEFAULT_REPORT_INTERVAL: u64 = 100_000;

/// Hit-rate figures for one reporting interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitRateSample {
    /// Store the sample was taken for
    pub store: String,
    /// Pages acquired during the interval
    pub acquired: u64,
    /// Pages mapped (misses) during the interval
    pub mapped: u64,
    /// Wall-clock length of the interval
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl HitRateSample {
    /// Build a sample from interval counts
    pub fn new(store: impl Into<String>, acquired: u64, mapped: u64, elapsed: Duration) -> Self {
        Self {
            store: store.into(),
            acquired,
            mapped,
            elapsed,
        }
    }

    /// Share of acquisitions that needed a mapping, in percent
    pub fn miss_percent(&self) -> f64 {
        if self.acquired == 0 {
            0.0
        } else {
            self.mapped as f64 * 100.0 / self.acquired as f64
        }
    }

    /// Share of acquisitions served from a resident page, in [0, 1]
    pub fn hit_rate(&self) -> f64 {
        if self.acquired == 0 {
            0.0
        } else {
            self.acquired.saturating_sub(self.mapped) as f64 / self.acquired as f64
        }
    }

    /// Interval length in whole milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

impl std::fmt::Display for HitRateSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "In {}: {} pages acquired, {} pages mapped ({:.2}%) in {} ms",
            self.store,
            self.acquired,
            self.mapped,
            self.miss_percent(),
            self.elapsed_ms()
        )
    }
}

/// Turns running acquire/map counters into per-interval samples.
#[derive(Debug)]
pub struct HitRateSampler {
    store: String,
    last_acquire_count: u64,
    last_map_count: u64,
    last_report: Instant,
}

impl HitRateSampler {
    pub fn new(store: impl Into<String>) -> Self {
        Self::starting_at(store, Instant::now())
    }

    /// Create a sampler whose first interval starts at `now`
    pub fn starting_at(store: impl Into<String>, now: Instant) -> Self {
        Self {
            store: store.into(),
            last_acquire_count: 0,
            last_map_count: 0,
            last_report: now,
        }
    }

    /// Whether the acquisition numbered `acquire_count` closes an interval
    /// of `interval` acquisitions. An interval of 0 never fires.
    pub fn is_due(interval: u64, acquire_count: u64) -> bool {
        interval != 0 && acquire_count != 0 && acquire_count % interval == 0
    }

    /// Close the current interval and start a new one.
    ///
    /// Counts are the running totals; the sample holds the deltas since the
    /// previous call. Totals that went backwards yield zero deltas.
    pub fn sample(&mut self, acquire_count: u64, map_count: u64, now: Instant) -> HitRateSample {
        let acquired = acquire_count.saturating_sub(self.last_acquire_count);
        let mapped = map_count.saturating_sub(self.last_map_count);
        let elapsed = now.saturating_duration_since(self.last_report);

        self.last_acquire_count = self.last_acquire_count.max(acquire_count);
        self.last_map_count = self.last_map_count.max(map_count);
        self.last_report = now;

        HitRateSample::new(self.store.clone(), acquired, mapped, elapsed)
    }
}
