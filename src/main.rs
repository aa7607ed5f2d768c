use tokio_util::sync::CancellationToken;

pub mod config;
use config::{load_config, setup_resolver};
pub mod http_probe;
use http_probe::prelude::*;
pub mod mimir;
use mimir::{client::MimirClient, registry::MetricsRegistry};
pub mod scheduler;
use scheduler::MetricsExport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_config = load_config()?;
    let settings = app_config.settings;

    let resolver = if settings.resolve_dns {
        Some(setup_resolver(app_config.dns_hosts.as_deref())?)
    } else {
        None
    };
    let prober = Prober::new(&settings, resolver)?;

    let mimir_client = settings.metrics.as_ref().map(MimirClient::new).transpose()?;
    let mut registry = MetricsRegistry::new();
    let metrics = mimir_client.as_ref().map(|client| MetricsExport {
        registry: &mut registry,
        client,
    });

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received Ctrl-C, stopping after the current iteration");
                ctrl_c.cancel();
            }
            Err(e) => log::error!("Unable to listen for Ctrl-C: {e}"),
        }
    });

    let mut stdout = std::io::stdout();
    scheduler::run(&settings, &prober, &mut stdout, metrics, shutdown).await;

    Ok(())
}
