use std::fmt;

use url::{Host, Url};

use crate::config::error::ConfigError;

/// A single address under observation.
///
/// The address is kept exactly as configured, since it is what gets printed
/// and used as the `target` label. The host is extracted once so the prober
/// does not have to re-parse the URL on every iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    address: String,
    host: String,
}

impl Target {
    pub fn parse(address: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTarget {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(address).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("only http and https targets can be probed"));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => return Err(invalid("missing host")),
        };

        Ok(Self {
            address: address.to_string(),
            host,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The host name or IP literal to resolve, without IPv6 brackets.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
