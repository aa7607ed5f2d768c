use serde::Deserialize;

/// The probe configuration for the OxyProbe service, as read from the YAML config file.
/// Contains the polling interval, the probe options, the list of targets and an optional metrics sink.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// The polling interval in seconds. The loop sleeps this long after every iteration.
    pub polling_interval_seconds: u64,

    /// Upper bound for a single probe request, in seconds.
    /// Defaults to 5 if not specified.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Resolve the target host before issuing the request.
    /// A target whose host does not resolve is reported without an HTTP attempt.
    #[serde(default = "default_resolve_dns")]
    pub resolve_dns: bool,

    /// Accept invalid TLS certificates. Off by default, so certificate problems show up as transport errors.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Number of probes allowed in flight within one iteration.
    /// Defaults to 1, which probes the targets strictly one after another.
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// The URLs to probe, in reporting order.
    pub targets: Vec<String>,

    /// Where to push the aggregated metrics, if anywhere.
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}

/// A Prometheus remote-write sink, typically Grafana Mimir.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// The base URL of the sink (e.g. "http://localhost:9009"). `/api/v1/push` is appended.
    pub endpoint: String,

    /// The tenant for multi-tenant setups.
    /// This translates to the 'X-Scope-OrgID' header in the push requests.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Upper bound for a single push request, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_resolve_dns() -> bool {
    true
}

fn default_max_concurrent_probes() -> usize {
    1
}
