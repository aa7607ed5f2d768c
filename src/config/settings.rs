use std::{num::NonZeroUsize, time::Duration};

use crate::http_probe::target::Target;

use super::{
    error::ConfigError,
    probe_config::{MetricsConfig, ProbeConfig},
};

/// Validated, immutable runtime configuration. Built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub targets: Vec<Target>,
    pub interval: Duration,
    pub timeout: Duration,
    pub resolve_dns: bool,
    pub accept_invalid_certs: bool,
    pub max_concurrent_probes: NonZeroUsize,
    pub metrics: Option<SinkSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    pub endpoint: String,
    pub tenant_id: Option<String>,
    pub timeout: Duration,
}

impl Settings {
    /// Settings with the defaults of the config file for everything but the targets and interval.
    pub fn new(targets: Vec<Target>, interval: Duration) -> Self {
        Self {
            targets,
            interval,
            timeout: Duration::from_secs(5),
            resolve_dns: true,
            accept_invalid_certs: false,
            max_concurrent_probes: NonZeroUsize::MIN,
            metrics: None,
        }
    }
}

fn positive_seconds(name: &str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be positive")));
    }
    Ok(Duration::from_secs(seconds))
}

impl TryFrom<MetricsConfig> for SinkSettings {
    type Error = ConfigError;

    fn try_from(config: MetricsConfig) -> Result<Self, Self::Error> {
        let endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
        url::Url::parse(&endpoint).map_err(|e| {
            ConfigError::Invalid(format!("invalid metrics endpoint '{endpoint}': {e}"))
        })?;

        Ok(Self {
            endpoint,
            tenant_id: config.tenant_id.filter(|id| !id.is_empty()),
            timeout: positive_seconds("metrics.timeout_seconds", config.timeout_seconds)?,
        })
    }
}

impl TryFrom<ProbeConfig> for Settings {
    type Error = ConfigError;

    fn try_from(config: ProbeConfig) -> Result<Self, Self::Error> {
        if config.targets.is_empty() {
            return Err(ConfigError::Invalid("at least one target is required".into()));
        }

        let targets = config
            .targets
            .iter()
            .map(|address| Target::parse(address.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let max_concurrent_probes = NonZeroUsize::new(config.max_concurrent_probes)
            .ok_or_else(|| ConfigError::Invalid("max_concurrent_probes must be at least 1".into()))?;

        Ok(Self {
            targets,
            interval: positive_seconds("polling_interval_seconds", config.polling_interval_seconds)?,
            timeout: positive_seconds("timeout_seconds", config.timeout_seconds)?,
            resolve_dns: config.resolve_dns,
            accept_invalid_certs: config.accept_invalid_certs,
            max_concurrent_probes,
            metrics: config.metrics.map(SinkSettings::try_from).transpose()?,
        })
    }
}
