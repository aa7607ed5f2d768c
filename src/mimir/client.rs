use chrono::Utc;
use prost::Message;
use reqwest::{
    Client, StatusCode,
    header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use snap::raw::Encoder;
use thiserror::Error;

use super::prompb::{Label, Sample, TimeSeries, WriteRequest};
use crate::config::SinkSettings;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid tenant id")]
    Tenant(#[from] InvalidHeaderValue),

    #[error("failed to build push client")]
    Client(#[source] reqwest::Error),

    #[error("failed to compress write request")]
    Compress(#[from] snap::Error),

    #[error("push request failed")]
    Request(#[source] reqwest::Error),

    #[error("push rejected: {status} - {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Pushes Prometheus metrics to a Mimir (or any remote-write compatible) endpoint.
pub struct MimirClient {
    client: Client,
    push_url: String,
    headers: HeaderMap,
}

impl MimirClient {
    pub fn new(sink: &SinkSettings) -> Result<Self, PushError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("snappy"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-protobuf"),
        );
        headers.insert(
            "X-Prometheus-Remote-Write-Version",
            HeaderValue::from_static("0.1.0"),
        );
        if let Some(id) = &sink.tenant_id {
            headers.insert("X-Scope-OrgID", HeaderValue::from_str(id)?);
        }

        let client = Client::builder()
            .timeout(sink.timeout)
            .build()
            .map_err(PushError::Client)?;

        Ok(Self {
            client,
            push_url: format!("{}/api/v1/push", sink.endpoint), // Mimir's remote write endpoint
            headers,
        })
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }

    /// Sends `metrics` as one snappy-compressed `WriteRequest`.
    pub async fn push(&self, metrics: Vec<TimeSeries>) -> Result<(), PushError> {
        if metrics.is_empty() {
            log::warn!("No metrics to send.");
            return Ok(());
        }

        let write_request = WriteRequest {
            timeseries: metrics,
        };
        let buf = write_request.encode_to_vec();

        let mut encoder = Encoder::new();
        let compressed_data = encoder.compress_vec(&buf)?;

        let response = self
            .client
            .post(&self.push_url)
            .headers(self.headers.clone())
            .body(compressed_data)
            .send()
            .await
            .map_err(PushError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected { status, body });
        }

        log::debug!(
            "Pushed {} series to {}",
            write_request.timeseries.len(),
            self.push_url
        );
        Ok(())
    }
}

/// Creates a `TimeSeries` metric with the given metric name, labels, value, and optional timestamp.
/// Labels are sorted by name, as remote-write receivers require.
/// # Arguments
///     * `metric_name` - The name of the metric (e.g., "probe_responses_total").
///     * `labels` - A slice of tuples representing labels for the metric (e.g., &[("target", "https://example.com")]).
///     * `value` - The value of the metric.
///     * `timestamp_ms` - An optional timestamp in milliseconds. If not provided, the current time will be used.
pub fn create_time_series(
    metric_name: &str,
    labels: &[(&str, &str)],
    value: f64,
    timestamp_ms: Option<i64>,
) -> TimeSeries {
    let mut all_labels = Vec::with_capacity(labels.len() + 1);
    all_labels.push(Label {
        name: "__name__".to_string(),
        value: metric_name.to_string(),
    });

    for (name, val) in labels {
        all_labels.push(Label {
            name: name.to_string(),
            value: val.to_string(),
        });
    }
    all_labels.sort_by(|a, b| a.name.cmp(&b.name));

    let sample = Sample {
        value,
        timestamp: timestamp_ms.unwrap_or_else(|| Utc::now().timestamp_millis()),
    };

    TimeSeries {
        labels: all_labels,
        samples: vec![sample],
    }
}
