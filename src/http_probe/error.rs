use thiserror::Error;

/// Why a probe produced no HTTP status. Neither variant is fatal to the loop.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The host lookup failed, so no request was sent.
    #[error("unable to resolve dns name {host}: {reason}")]
    Resolution { host: String, reason: String },

    /// Connection refused, timeout, TLS failure and friends.
    #[error("unable to connect to endpoint")]
    Transport(#[source] reqwest::Error),
}

impl ProbeError {
    /// One-line rendering including the underlying causes.
    pub fn report(&self) -> String {
        super::report(self)
    }
}
