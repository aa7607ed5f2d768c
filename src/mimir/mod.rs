use prompb::TimeSeries;
use registry::MetricsRegistry;

pub mod client;
pub mod prompb;
pub mod registry;

const INSTANCE_LABEL: &str = "instance";
const JOB_LABEL: &str = "job";
const TARGET_LABEL: &str = "target";
const STATUS_CODE_LABEL: &str = "status_code";
const LE_LABEL: &str = "le";
const PROBE_RESPONSES_METRIC: &str = "probe_responses_total";
const PROBE_LATENCY_BUCKET_METRIC: &str = "probe_latency_seconds_bucket";
const PROBE_LATENCY_SUM_METRIC: &str = "probe_latency_seconds_sum";
const PROBE_LATENCY_COUNT_METRIC: &str = "probe_latency_seconds_count";

const PROBE_JOB: &str = "oxyprobe";

fn create_time_series(
    metric_name: &str,
    target: &str,
    value: f64,
    additional_labels: &[(&str, &str)],
    timestamp_ms: i64,
) -> TimeSeries {
    let mut labels: Vec<(&str, &str)> = vec![
        (INSTANCE_LABEL, target),
        (JOB_LABEL, PROBE_JOB),
        (TARGET_LABEL, target),
    ];
    labels.extend_from_slice(additional_labels);

    client::create_time_series(metric_name, &labels, value, Some(timestamp_ms))
}

/// Creates the full snapshot of the registry as remote-write series, all stamped with `timestamp_ms`.
/// The series are:
///    - `probe_responses_total{target, status_code}`: probes per target and status (0 for unreachable).
///    - `probe_latency_seconds_bucket{target, le}`: cumulative latency buckets, including `le="+Inf"`.
///    - `probe_latency_seconds_sum{target}` and `probe_latency_seconds_count{target}`.
pub fn create_registry_metrics(registry: &MetricsRegistry, timestamp_ms: i64) -> Vec<TimeSeries> {
    let mut metrics = Vec::new();

    for (target, status_code, count) in registry.responses() {
        let status_code = status_code.to_string();
        metrics.push(create_time_series(
            PROBE_RESPONSES_METRIC,
            target,
            count as f64,
            &[(STATUS_CODE_LABEL, status_code.as_str())],
            timestamp_ms,
        ));
    }

    for (target, histogram) in registry.latencies() {
        for (bound, count) in histogram.buckets() {
            let le = bound.to_string();
            metrics.push(create_time_series(
                PROBE_LATENCY_BUCKET_METRIC,
                target,
                count as f64,
                &[(LE_LABEL, le.as_str())],
                timestamp_ms,
            ));
        }
        metrics.push(create_time_series(
            PROBE_LATENCY_BUCKET_METRIC,
            target,
            histogram.count() as f64,
            &[(LE_LABEL, "+Inf")],
            timestamp_ms,
        ));
        metrics.push(create_time_series(
            PROBE_LATENCY_SUM_METRIC,
            target,
            histogram.sum(),
            &[],
            timestamp_ms,
        ));
        metrics.push(create_time_series(
            PROBE_LATENCY_COUNT_METRIC,
            target,
            histogram.count() as f64,
            &[],
            timestamp_ms,
        ));
    }

    metrics
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http_probe::prelude::*;
    use crate::mimir::registry::LATENCY_BUCKETS;

    fn label<'a>(series: &'a TimeSeries, name: &str) -> Option<&'a str> {
        series
            .labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    #[test]
    fn empty_registry_has_no_series() {
        assert!(create_registry_metrics(&MetricsRegistry::new(), 0).is_empty());
    }

    #[test]
    fn snapshot_contains_counter_and_histogram() {
        let target = Target::parse("https://www.github.com").unwrap();
        let mut registry = MetricsRegistry::new();
        registry.record(&ProbeResult::response(&target, 200, Duration::from_millis(30)));
        registry.record(&ProbeResult::response(&target, 200, Duration::from_millis(300)));

        let metrics = create_registry_metrics(&registry, 1_700_000_000_000);
        // one counter, the buckets plus +Inf, sum and count
        assert_eq!(metrics.len(), 1 + LATENCY_BUCKETS.len() + 3);
        assert!(metrics.iter().all(|s| s.samples[0].timestamp == 1_700_000_000_000));
        assert!(metrics.iter().all(|s| label(s, "job") == Some("oxyprobe")));
        assert!(metrics.iter().all(|s| label(s, "instance") == Some("https://www.github.com")));

        let counter = &metrics[0];
        assert_eq!(label(counter, "__name__"), Some("probe_responses_total"));
        assert_eq!(label(counter, "status_code"), Some("200"));
        assert_eq!(counter.samples[0].value, 2.0);

        let bucket = |le: &str| {
            metrics
                .iter()
                .find(|s| {
                    label(s, "__name__") == Some("probe_latency_seconds_bucket")
                        && label(s, "le") == Some(le)
                })
                .map(|s| s.samples[0].value)
        };
        assert_eq!(bucket("0.025"), Some(0.0));
        assert_eq!(bucket("0.05"), Some(1.0));
        assert_eq!(bucket("0.5"), Some(2.0));
        assert_eq!(bucket("1"), Some(2.0));
        assert_eq!(bucket("+Inf"), Some(2.0));

        let count = metrics
            .iter()
            .find(|s| label(s, "__name__") == Some("probe_latency_seconds_count"))
            .unwrap();
        assert_eq!(count.samples[0].value, 2.0);
    }
}
