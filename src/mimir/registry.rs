use std::collections::BTreeMap;

use crate::http_probe::result::ProbeResult;

/// Upper bounds of the latency histogram buckets, in seconds (the Prometheus client defaults).
pub const LATENCY_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Cumulative latency histogram for one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    buckets: [u64; LATENCY_BUCKETS.len()],
    count: u64,
    sum: f64,
}

impl Histogram {
    pub fn observe(&mut self, seconds: f64) {
        for (bound, bucket) in LATENCY_BUCKETS.iter().zip(self.buckets.iter_mut()) {
            if seconds <= *bound {
                *bucket += 1;
            }
        }
        self.count += 1;
        self.sum += seconds;
    }

    /// `(upper bound, observations <= bound)` pairs, excluding `+Inf` (which equals `count`).
    pub fn buckets(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        LATENCY_BUCKETS.iter().copied().zip(self.buckets.iter().copied())
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }
}

/// Accumulated probe metrics since process start.
///
/// Owned by whoever runs the loop and only mutated between probes, so it needs no locking.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    responses: BTreeMap<(String, u16), u64>,
    latencies: BTreeMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the result under `(target, status_code)`. Only results with an HTTP response
    /// feed the latency histogram; unreachable targets would otherwise drag it to zero.
    pub fn record(&mut self, result: &ProbeResult) {
        let target = result.target.address();

        *self
            .responses
            .entry((target.to_string(), result.status_code))
            .or_default() += 1;

        if result.is_reachable() {
            self.latencies
                .entry(target.to_string())
                .or_default()
                .observe(result.latency.as_secs_f64());
        }
    }

    pub fn response_count(&self, target: &str, status_code: u16) -> u64 {
        self.responses
            .get(&(target.to_string(), status_code))
            .copied()
            .unwrap_or(0)
    }

    pub fn latency(&self, target: &str) -> Option<&Histogram> {
        self.latencies.get(target)
    }

    /// `(target, status_code, count)` ordered by target, then status code.
    pub fn responses(&self) -> impl Iterator<Item = (&str, u16, u64)> + '_ {
        self.responses
            .iter()
            .map(|((target, status), count)| (target.as_str(), *status, *count))
    }

    pub fn latencies(&self) -> impl Iterator<Item = (&str, &Histogram)> + '_ {
        self.latencies.iter().map(|(target, h)| (target.as_str(), h))
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
