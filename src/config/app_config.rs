use std::env;
use std::{net::IpAddr, path::Path, time::Duration};

use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
};

use super::{
    error::ConfigError,
    probe_config::ProbeConfig,
    settings::{Settings, SinkSettings},
};

const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AppConfig {
    pub settings: Settings,
    /// Name servers from `DNS_HOSTS`. `None` means the system resolver configuration.
    pub dns_hosts: Option<Vec<IpAddr>>,
}

/// Load the application configuration from a YAML file and environment variables
/// This function reads the configuration file specified by the `CONFIG_FILE` environment variable,
/// validates it into `Settings`, and overrides the metrics sink with `MIMIR_ENDPOINT` / `MIMIR_TENANT_ID`.
/// It also picks up the DNS hosts from `DNS_HOSTS`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let config_file_location =
        env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yml".to_string());
    let mut settings = load_settings(&config_file_location)?;

    apply_sink_overrides(
        &mut settings,
        env::var("MIMIR_ENDPOINT").ok(),
        env::var("MIMIR_TENANT_ID").ok(),
    )?;

    let dns_hosts = match env::var("DNS_HOSTS") {
        Ok(hosts) => Some(parse_dns_hosts(&hosts)?),
        Err(_) => None,
    };

    log::info!(
        "Loaded {} targets from {config_file_location}, polling every {:?}",
        settings.targets.len(),
        settings.interval
    );
    match &dns_hosts {
        Some(hosts) => log::info!("Using DNS hosts: {:?}", hosts),
        None => log::info!("Using system DNS configuration"),
    }
    match &settings.metrics {
        Some(sink) => log::info!("Using Mimir endpoint: {}", sink.endpoint),
        None => log::info!("No metrics sink configured, reporting to console only"),
    }

    Ok(AppConfig {
        settings,
        dns_hosts,
    })
}

/// Read and validate the YAML config file at `path`.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let config: ProbeConfig = serde_yaml::from_str(&config_str)?;
    Settings::try_from(config)
}

/// Environment values win over the config file. An endpoint from the environment
/// enables the sink even if the file has no `metrics` section.
pub fn apply_sink_overrides(
    settings: &mut Settings,
    endpoint: Option<String>,
    tenant_id: Option<String>,
) -> Result<(), ConfigError> {
    let endpoint = endpoint.filter(|e| !e.trim().is_empty());
    let tenant_id = tenant_id.filter(|t| !t.trim().is_empty());

    let sink = match (settings.metrics.take(), endpoint) {
        (Some(mut sink), Some(endpoint)) => {
            sink.endpoint = endpoint.trim().trim_end_matches('/').to_string();
            Some(sink)
        }
        (None, Some(endpoint)) => Some(SinkSettings {
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            tenant_id: None,
            timeout: DEFAULT_PUSH_TIMEOUT,
        }),
        (sink, None) => sink,
    };

    settings.metrics = match sink {
        Some(mut sink) => {
            url::Url::parse(&sink.endpoint).map_err(|e| {
                ConfigError::Invalid(format!("invalid metrics endpoint '{}': {e}", sink.endpoint))
            })?;
            if tenant_id.is_some() {
                sink.tenant_id = tenant_id;
            }
            Some(sink)
        }
        None => None,
    };
    Ok(())
}

pub fn parse_dns_hosts(hosts: &str) -> Result<Vec<IpAddr>, ConfigError> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(|host| {
            host.parse().map_err(|source| ConfigError::DnsHost {
                host: host.to_string(),
                source,
            })
        })
        .collect()
}

/// Setup a DNS resolver using the provided DNS hosts
/// This function creates a `TokioAsyncResolver` configured with the specified DNS hosts.
/// It sets the resolver options to have 2 attempts, a timeout of 100 milliseconds, and a cache size of 1024 for quick DNS lookups.
/// Without DNS hosts the system configuration (`/etc/resolv.conf`) is used instead.
pub fn setup_resolver(dns_hosts: Option<&[IpAddr]>) -> Result<TokioAsyncResolver, ConfigError> {
    let Some(dns_hosts) = dns_hosts.filter(|hosts| !hosts.is_empty()) else {
        return TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| ConfigError::Invalid(format!("unable to read system DNS config: {e}")));
    };

    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = Duration::from_millis(100);
    opts.cache_size = 1024;

    let mut name_servers = NameServerConfigGroup::new();

    for ip in dns_hosts {
        name_servers.push(NameServerConfig {
            socket_addr: (*ip, 53).into(),
            protocol: Protocol::Tcp, // TCP is more reliable then UDP for DNS queries
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}
