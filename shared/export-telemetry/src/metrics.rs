//! Metrics primitives and the export metric set

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic counter
#[derive(Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
    name: String,
}

impl Counter {
    pub fn new(name: &str) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
            name: name.to_string(),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Up/down gauge. Never drops below zero.
#[derive(Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicU64>,
    name: String,
}

impl Gauge {
    pub fn new(name: &str) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
            name: name.to_string(),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        let _ = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Bounded sample window for latency percentiles
#[derive(Clone)]
pub struct Histogram {
    samples: Arc<Mutex<Vec<f64>>>,
    name: String,
    max_samples: usize,
}

impl Histogram {
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, 1024)
    }

    pub fn with_capacity(name: &str, max_samples: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(Vec::with_capacity(max_samples.min(1024)))),
            name: name.to_string(),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&self, value: f64) {
        let mut samples = self.samples.lock();
        if samples.len() >= self.max_samples {
            samples.remove(0);
        }
        samples.push(value);
    }

    pub fn count(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn percentile(&self, p: f64) -> f64 {
        let mut sorted = self.samples.lock().clone();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = ((sorted.len() as f64) * p / 100.0) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn mean(&self) -> f64 {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Counters and timings for the export pipeline
#[derive(Clone)]
pub struct ExportMetrics {
    pub attempted: Counter,
    pub succeeded: Counter,
    pub failed: Counter,
    pub skipped_config: Counter,
    pub in_flight: Gauge,
    pub send_latency_ms: Histogram,
}

impl Default for ExportMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportMetrics {
    pub fn new() -> Self {
        Self {
            attempted: Counter::new("exports_attempted"),
            succeeded: Counter::new("exports_succeeded"),
            failed: Counter::new("exports_failed"),
            skipped_config: Counter::new("exports_skipped_config"),
            in_flight: Gauge::new("exports_in_flight"),
            send_latency_ms: Histogram::new("send_latency_ms"),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            exports_attempted: self.attempted.get(),
            exports_succeeded: self.succeeded.get(),
            exports_failed: self.failed.get(),
            exports_skipped_config: self.skipped_config.get(),
            exports_in_flight: self.in_flight.get(),
            send_latency_ms_p50: self.send_latency_ms.percentile(50.0),
            send_latency_ms_p99: self.send_latency_ms.percentile(99.0),
            send_latency_ms_mean: self.send_latency_ms.mean(),
        }
    }
}

/// Point-in-time view of [`ExportMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub exports_attempted: u64,
    pub exports_succeeded: u64,
    pub exports_failed: u64,
    pub exports_skipped_config: u64,
    pub exports_in_flight: u64,
    pub send_latency_ms_p50: f64,
    pub send_latency_ms_p99: f64,
    pub send_latency_ms_mean: f64,
}
