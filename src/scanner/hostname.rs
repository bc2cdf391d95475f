//! Reverse DNS lookups.

use super::traits::HostnameResolver;
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Default bound for one reverse lookup.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);

/// PTR lookups through the system resolver configuration.
pub struct DnsHostnameResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsHostnameResolver {
    /// Build a resolver from the system configuration, or the library
    /// default when it cannot be read.
    pub fn new(lookup_timeout: Duration) -> Self {
        let (config, mut opts) = match trust_dns_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                debug!(error = %e, "system resolver config unavailable, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = lookup_timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout: lookup_timeout,
        }
    }
}

impl Default for DnsHostnameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_TIMEOUT)
    }
}

#[async_trait]
impl HostnameResolver for DnsHostnameResolver {
    async fn reverse(&self, ip: IpAddr) -> Option<String> {
        let lookup = match timeout(self.timeout, self.resolver.reverse_lookup(ip)).await {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(e)) => {
                trace!(%ip, error = %e, "reverse lookup failed");
                return None;
            }
            Err(_) => {
                trace!(%ip, "reverse lookup timed out");
                return None;
            }
        };

        lookup
            .iter()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .find(|name| !name.is_empty())
    }
}
