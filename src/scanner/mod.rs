//! Scanner module - the discovery-and-scan pipeline.
//!
//! [`NetScanner`] ties the pieces together: it validates a request, runs
//! host discovery, then hands the discovered hosts to the [`Coordinator`]
//! for reverse lookups, port scans and vendor resolution.

pub mod coordinator;
pub mod hostname;
pub mod ports;
pub mod tcp;
pub mod traits;

pub use coordinator::{Coordinator, HostResult, ResultCollector, DEFAULT_MAX_HOSTS};
pub use hostname::DnsHostnameResolver;
pub use ports::{PortScanner, DEFAULT_WORKERS};
pub use tcp::TcpConnectProber;
pub use traits::{HostnameResolver, NoopResolver, PortProber};

use crate::config::AppSettings;
use crate::discovery::Discovery;
use crate::error::ScanResult;
use crate::types::{ScanConfig, ScanRequest};
use crate::vendor::VendorDatabase;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Full discovery-and-scan pipeline for one request at a time.
pub struct NetScanner {
    discovery: Discovery,
    coordinator: Coordinator,
    progress: Option<ProgressBar>,
}

impl NetScanner {
    /// Assemble a scanner from explicit parts.
    pub fn new(discovery: Discovery, coordinator: Coordinator) -> Self {
        Self {
            discovery,
            coordinator,
            progress: None,
        }
    }

    /// Standard pipeline: TCP connect probes, system DNS, the given vendor
    /// table and the tunables from `settings`.
    pub fn from_settings(settings: &AppSettings, vendors: Arc<dyn VendorDatabase>) -> Self {
        let prober: Arc<dyn PortProber> = Arc::new(TcpConnectProber::new());
        let resolver = Arc::new(DnsHostnameResolver::new(settings.dns_timeout()));
        let discovery = Discovery::with_options(settings.discovery_options(), Arc::clone(&prober));
        let coordinator = Coordinator::new(PortScanner::new(prober), resolver, vendors)
            .with_max_hosts(settings.max_concurrent_hosts);

        Self::new(discovery, coordinator)
    }

    /// Report per-host progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Validate `request` and scan it.
    ///
    /// # Errors
    /// Malformed targets or port specs, and discovery failures that prevent
    /// the selected strategy from running at all.
    pub async fn run(&self, request: &ScanRequest) -> ScanResult<Vec<HostResult>> {
        let config = ScanConfig::try_from(request)?;
        self.run_config(&config).await
    }

    /// Scan an already validated request.
    pub async fn run_config(&self, config: &ScanConfig) -> ScanResult<Vec<HostResult>> {
        let started = Instant::now();
        info!(
            target = %config.target,
            ports = config.ports.len(),
            discovery = %config.discovery,
            "starting scan"
        );

        let hosts = self
            .discovery
            .discover(&config.target, config.discovery, &config.ports)
            .await?;

        let results = self
            .coordinator
            .enrich(hosts, config, self.progress.as_ref())
            .await;

        if let Some(pb) = &self.progress {
            pb.finish_with_message("scan complete");
        }

        info!(
            hosts = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );
        Ok(results)
    }
}
