use std::time::Duration;

use super::prelude::*;

/// Outcome of a single probe. `status_code` is 0 and `latency` is zero whenever `error` is set.
#[derive(Debug)]
pub struct ProbeResult {
    pub target: Target,
    pub status_code: u16,
    pub latency: Duration,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn response(target: &Target, status_code: u16, latency: Duration) -> Self {
        Self {
            target: target.clone(),
            status_code,
            latency,
            error: None,
        }
    }

    pub fn failure(target: &Target, error: ProbeError) -> Self {
        Self {
            target: target.clone(),
            status_code: 0,
            latency: Duration::ZERO,
            error: Some(error),
        }
    }

    /// Whether the target answered with any HTTP status at all.
    pub fn is_reachable(&self) -> bool {
        self.error.is_none()
    }
}
