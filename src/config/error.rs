use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid target '{address}': {reason}")]
    InvalidTarget { address: String, reason: String },

    #[error("invalid DNS host '{host}': {source}")]
    DnsHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
