//! Host discovery.
//!
//! Three techniques produce an IP -> MAC map for a target range:
//! - [`ArpSweep`] - raw ARP who-has broadcast (default)
//! - [`NeighborCache`] - ping sweep followed by an OS neighbor table read
//! - [`TcpFallback`] - TCP connects to well-known ports, used only when the
//!   selected technique finds nothing
//!
//! An empty MAC string means the host is alive but its hardware address is
//! unknown.

pub mod arp_sweep;
pub mod neighbor_cache;
pub mod tcp_fallback;

pub use arp_sweep::ArpSweep;
pub use neighbor_cache::{read_neighbor_table, NeighborCache};
pub use tcp_fallback::TcpFallback;

use crate::error::ScanResult;
use crate::scanner::PortProber;
use crate::types::{DiscoveryMode, Port, TargetSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Discovered hosts keyed by address. Values are MACs, empty when unknown.
pub type AddressMacMap = HashMap<Ipv4Addr, String>;

/// A layer-2 discovery technique.
#[async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Discover live hosts in `target`.
    async fn discover(&self, target: &TargetSpec) -> ScanResult<AddressMacMap>;
}

/// Tunables for the discovery strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// How long the ARP sweep listens for replies.
    pub sweep_timeout: Duration,
    /// Delay between the ping sweep and the neighbor table read.
    pub cache_settle: Duration,
    /// Hard limit for one ping process.
    pub ping_timeout: Duration,
    /// Ping processes allowed at once.
    pub max_pings: usize,
    /// Hosts probed at once by the TCP fallback.
    pub fallback_concurrency: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            sweep_timeout: Duration::from_millis(1200),
            cache_settle: Duration::from_millis(500),
            ping_timeout: Duration::from_millis(1200),
            max_pings: 256,
            fallback_concurrency: 256,
        }
    }
}

/// Discovery orchestrator.
pub struct Discovery {
    sweep: Arc<dyn DiscoveryStrategy>,
    cache: Arc<dyn DiscoveryStrategy>,
    fallback: TcpFallback,
}

impl Discovery {
    /// Assemble an orchestrator from explicit strategies.
    pub fn new(
        sweep: Arc<dyn DiscoveryStrategy>,
        cache: Arc<dyn DiscoveryStrategy>,
        fallback: TcpFallback,
    ) -> Self {
        Self {
            sweep,
            cache,
            fallback,
        }
    }

    /// Build the standard strategies.
    pub fn with_options(options: DiscoveryOptions, prober: Arc<dyn PortProber>) -> Self {
        Self::new(
            Arc::new(ArpSweep::new(options.sweep_timeout)),
            Arc::new(NeighborCache::new(
                options.cache_settle,
                options.ping_timeout,
                options.max_pings,
            )),
            TcpFallback::new(prober, options.fallback_concurrency),
        )
    }

    /// Run the strategy selected by `mode`, falling back to TCP probing
    /// when it finds no hosts.
    ///
    /// # Errors
    /// Fails only when the selected strategy cannot run at all (no
    /// interface on the target subnet, no raw socket access).
    pub async fn discover(
        &self,
        target: &TargetSpec,
        mode: DiscoveryMode,
        ports: &[Port],
    ) -> ScanResult<AddressMacMap> {
        let strategy = match mode {
            DiscoveryMode::ArpRaw => &self.sweep,
            DiscoveryMode::ArpCache => &self.cache,
        };

        let hosts = strategy.discover(target).await?;
        if !hosts.is_empty() {
            info!(strategy = strategy.name(), hosts = hosts.len(), "discovery complete");
            return Ok(hosts);
        }

        info!(
            strategy = strategy.name(),
            "no hosts found, falling back to TCP connect probes"
        );
        let hosts = self.fallback.discover(target, ports.first().copied()).await;
        info!(hosts = hosts.len(), "TCP fallback discovery complete");
        Ok(hosts)
    }
}
