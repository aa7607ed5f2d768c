use std::future::Future;

use trust_dns_resolver::TokioAsyncResolver;

/// Pre-flight host lookup done before a probe request is sent.
pub trait HostResolver: Send + Sync {
    /// `Ok` when the host resolves to at least one address, otherwise the reason it did not.
    fn resolve(&self, host: &str) -> impl Future<Output = Result<(), String>> + Send;
}

impl HostResolver for TokioAsyncResolver {
    async fn resolve(&self, host: &str) -> Result<(), String> {
        let lookup = self.lookup_ip(host).await.map_err(|e| e.to_string())?;
        if lookup.iter().next().is_none() {
            return Err(format!("no addresses found for {host}"));
        }
        Ok(())
    }
}
