use std::io::Write;
use std::num::NonZeroUsize;

use chrono::Utc;
use futures::{StreamExt, stream};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::http_probe::prelude::*;
use crate::mimir::{client::MimirClient, create_registry_metrics, registry::MetricsRegistry};

pub mod report;

/// The registry to feed and the sink to push it to after every iteration.
pub struct MetricsExport<'a> {
    pub registry: &'a mut MetricsRegistry,
    pub client: &'a MimirClient,
}

impl MetricsExport<'_> {
    /// Record `results` and push the whole registry. A failed push is logged and dropped;
    /// the counts stay in the registry and go out with the next push.
    pub async fn publish(&mut self, results: &[ProbeResult]) {
        for result in results {
            self.registry.record(result);
        }

        let metrics = create_registry_metrics(self.registry, Utc::now().timestamp_millis());
        if let Err(e) = self.client.push(metrics).await {
            log::error!(
                "Failed to send metrics to {}: {}",
                self.client.push_url(),
                crate::http_probe::report(&e)
            );
        }
    }
}

/// Probe every target once and return the results in target order.
///
/// With `max_concurrent_probes` of 1 the targets are probed strictly one after another.
/// Higher values keep up to that many probes in flight, still yielding results in target order.
pub async fn run_iteration<R: HostResolver>(
    prober: &Prober<R>,
    targets: &[Target],
    max_concurrent_probes: NonZeroUsize,
) -> Vec<ProbeResult> {
    if max_concurrent_probes.get() == 1 {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            results.push(prober.probe(target).await);
        }
        return results;
    }

    stream::iter(targets)
        .map(|target| prober.probe(target))
        .buffered(max_concurrent_probes.get())
        .collect::<Vec<_>>()
        .await
}

/// Probe, report, push, sleep; until `shutdown` is cancelled.
///
/// Cancellation is honoured before an iteration starts and while sleeping, never in the
/// middle of an iteration. Returns the number of completed iterations.
pub async fn run<R: HostResolver, W: Write>(
    settings: &Settings,
    prober: &Prober<R>,
    out: &mut W,
    mut metrics: Option<MetricsExport<'_>>,
    shutdown: CancellationToken,
) -> u64 {
    let mut iterations = 0;

    while !shutdown.is_cancelled() {
        let results = run_iteration(prober, &settings.targets, settings.max_concurrent_probes).await;

        if let Err(e) = report::write_report(out, &results) {
            log::error!("Failed to write probe report: {e}");
        }

        if let Some(metrics) = metrics.as_mut() {
            metrics.publish(&results).await;
        }

        iterations += 1;

        if let Err(e) = report::write_sleeping(out, settings.interval) {
            log::error!("Failed to write probe report: {e}");
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(settings.interval) => {}
        }
    }

    log::info!("Probe loop stopped after {iterations} iterations");
    iterations
}
