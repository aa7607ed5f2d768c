use std::time::Instant;

use reqwest::Client;

use super::prelude::*;
use super::report;
use crate::config::Settings;

const USER_AGENT: &str = concat!("oxyprobe/", env!("CARGO_PKG_VERSION"));

/// Performs single checks against targets: optional host lookup, then one GET.
pub struct Prober<R> {
    client: Client,
    resolver: Option<R>,
}

impl<R: HostResolver> Prober<R> {
    /// Builds the HTTP client from `settings`. Pass `None` as resolver to skip the DNS pre-check.
    pub fn new(settings: &Settings, resolver: Option<R>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, resolver })
    }

    /// Probe `target` once. Never fails: errors are carried in the result.
    ///
    /// The latency covers the request only, up to the response headers; the DNS pre-check
    /// and the body are left out. Any HTTP status counts as a response, including 4xx and 5xx.
    pub async fn probe(&self, target: &Target) -> ProbeResult {
        if let Some(resolver) = &self.resolver {
            if let Err(reason) = resolver.resolve(target.host()).await {
                log::error!("Unable to resolve dns name for {target}: {reason}");
                return ProbeResult::failure(
                    target,
                    ProbeError::Resolution {
                        host: target.host().to_string(),
                        reason,
                    },
                );
            }
        }

        let start = Instant::now();
        let response = self.client.get(target.address()).send().await;
        let latency = start.elapsed();

        match response {
            Ok(response) => {
                log::debug!(
                    "{target} answered {} in {}ms",
                    response.status(),
                    latency.as_millis()
                );
                ProbeResult::response(target, response.status().as_u16(), latency)
            }
            Err(e) => {
                log::error!("Unable to connect to endpoint {target}: {}", report(&e));
                ProbeResult::failure(target, ProbeError::Transport(e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Resolves every host without touching the network.
    pub(crate) struct StaticResolver;

    impl HostResolver for StaticResolver {
        async fn resolve(&self, _host: &str) -> Result<(), String> {
            Ok(())
        }
    }

    /// Fails every lookup, like an NXDOMAIN answer would.
    pub(crate) struct FailingResolver;

    impl HostResolver for FailingResolver {
        async fn resolve(&self, host: &str) -> Result<(), String> {
            Err(format!("no record found for {host}"))
        }
    }

    pub(crate) fn settings_for(targets: &[String]) -> Settings {
        let targets = targets.iter().map(|t| Target::parse(t).unwrap()).collect();
        let mut settings = Settings::new(targets, Duration::from_millis(50));
        settings.timeout = Duration::from_secs(2);
        settings
    }

    #[tokio::test]
    async fn reports_server_status_and_latency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(10)))
            .expect(1)
            .mount(&server)
            .await;

        let address = format!("{}/health", server.uri());
        let settings = settings_for(&[address.clone()]);
        let prober = Prober::new(&settings, Some(StaticResolver)).unwrap();

        let result = prober.probe(&settings.targets[0]).await;
        assert_eq!(result.target.address(), address);
        assert_eq!(result.status_code, 200);
        assert!(result.latency >= Duration::from_millis(10));
        assert!(result.error.is_none());
        assert!(result.is_reachable());
    }

    #[tokio::test]
    async fn error_statuses_are_still_responses() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let settings = settings_for(&[
            format!("{}/missing", server.uri()),
            format!("{}/broken", server.uri()),
        ]);
        let prober = Prober::new(&settings, Some(StaticResolver)).unwrap();

        let missing = prober.probe(&settings.targets[0]).await;
        assert_eq!(missing.status_code, 404);
        assert!(missing.error.is_none());

        let broken = prober.probe(&settings.targets[1]).await;
        assert_eq!(broken.status_code, 500);
        assert!(broken.error.is_none());
    }

    #[tokio::test]
    async fn unresolvable_host_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let settings = settings_for(&[server.uri()]);
        let prober = Prober::new(&settings, Some(FailingResolver)).unwrap();

        let result = prober.probe(&settings.targets[0]).await;
        assert_eq!(result.status_code, 0);
        assert_eq!(result.latency, Duration::ZERO);
        match result.error {
            Some(ProbeError::Resolution { host, reason }) => {
                assert_eq!(host, "127.0.0.1");
                assert!(reason.contains("no record found"));
            }
            other => panic!("expected a resolution error, got {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn without_resolver_the_request_is_sent_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let settings = settings_for(&[server.uri()]);
        let prober = Prober::new(&settings, None::<FailingResolver>).unwrap();

        let result = prober.probe(&settings.targets[0]).await;
        assert_eq!(result.status_code, 204);
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let settings = settings_for(&[format!("http://127.0.0.1:{port}/")]);
        let prober = Prober::new(&settings, Some(StaticResolver)).unwrap();

        let result = prober.probe(&settings.targets[0]).await;
        assert_eq!(result.status_code, 0);
        assert_eq!(result.latency, Duration::ZERO);
        let error = result.error.expect("transport error expected");
        assert!(matches!(error, ProbeError::Transport(_)));
        assert!(error.report().starts_with("unable to connect to endpoint: "));
    }

    #[tokio::test]
    async fn hung_target_is_cut_off_by_the_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let mut settings = settings_for(&[server.uri()]);
        settings.timeout = Duration::from_millis(200);
        let prober = Prober::new(&settings, Some(StaticResolver)).unwrap();

        let start = Instant::now();
        let result = prober.probe(&settings.targets[0]).await;
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(result.status_code, 0);
        match result.error {
            Some(ProbeError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }
}
