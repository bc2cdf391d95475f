//! Per-host enrichment.
//!
//! Every discovered host gets a reverse lookup, a port scan and a vendor
//! lookup. Hosts are processed concurrently up to a fixed bound, which is
//! independent of the per-host port-scan worker count.

use super::ports::PortScanner;
use super::traits::HostnameResolver;
use crate::discovery::AddressMacMap;
use crate::types::{Port, ScanConfig};
use crate::vendor::{vendor_for_mac, VendorDatabase};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Hosts enriched at once unless configured otherwise.
pub const DEFAULT_MAX_HOSTS: usize = 200;

/// Result record for one discovered host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    pub ip: Ipv4Addr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Reserved; never populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_ms: Option<u64>,
    /// Ascending, duplicate-free.
    pub open_ports: Vec<u16>,
    pub scan_started: DateTime<Utc>,
    pub scan_duration_ms: u64,
}

/// Per-request result aggregator.
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Mutex<Vec<HostResult>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one result.
    pub async fn push(&self, result: HostResult) {
        self.results.lock().await.push(result);
    }

    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drain everything collected so far, in arrival order.
    pub async fn take(&self) -> Vec<HostResult> {
        std::mem::take(&mut *self.results.lock().await)
    }
}

/// Enrichment and scan coordinator.
#[derive(Clone)]
pub struct Coordinator {
    scanner: PortScanner,
    resolver: Arc<dyn HostnameResolver>,
    vendors: Arc<dyn VendorDatabase>,
    max_hosts: usize,
}

impl Coordinator {
    pub fn new(
        scanner: PortScanner,
        resolver: Arc<dyn HostnameResolver>,
        vendors: Arc<dyn VendorDatabase>,
    ) -> Self {
        Self {
            scanner,
            resolver,
            vendors,
            max_hosts: DEFAULT_MAX_HOSTS,
        }
    }

    /// Set the number of hosts enriched at once (`0` keeps the default).
    pub fn with_max_hosts(mut self, max_hosts: usize) -> Self {
        if max_hosts > 0 {
            self.max_hosts = max_hosts;
        }
        self
    }

    pub fn max_hosts(&self) -> usize {
        self.max_hosts
    }

    /// Produce one [`HostResult`] per entry of `hosts`.
    ///
    /// Returns after every host has finished. Result order follows
    /// completion, not address order.
    pub async fn enrich(
        &self,
        hosts: AddressMacMap,
        config: &ScanConfig,
        progress: Option<&ProgressBar>,
    ) -> Vec<HostResult> {
        let collector = Arc::new(ResultCollector::new());
        let semaphore = Arc::new(Semaphore::new(self.max_hosts));
        let ports: Arc<[Port]> = config.ports.clone().into();
        let mut tasks = JoinSet::new();

        if let Some(pb) = progress {
            pb.set_length(hosts.len() as u64);
        }

        for (ip, mac) in hosts {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let this = self.clone();
            let ports = Arc::clone(&ports);
            let collector = Arc::clone(&collector);
            let progress = progress.cloned();
            let timeout = config.timeout;
            let workers = config.concurrency;

            tasks.spawn(async move {
                let _permit = permit;
                let result = this.scan_host(ip, mac, &ports, timeout, workers).await;
                if let Some(pb) = progress {
                    pb.set_message(format!("{ip}: {} open", result.open_ports.len()));
                    pb.inc(1);
                }
                collector.push(result).await;
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "host enrichment task failed");
            }
        }

        collector.take().await
    }

    async fn scan_host(
        &self,
        ip: Ipv4Addr,
        mac: String,
        ports: &[Port],
        timeout: Duration,
        workers: usize,
    ) -> HostResult {
        let scan_started = Utc::now();
        let clock = Instant::now();
        let addr = IpAddr::V4(ip);

        let (hostname, open_ports) = tokio::join!(
            self.resolver.reverse(addr),
            self.scanner.scan(addr, ports, timeout, workers),
        );

        let vendor = vendor_for_mac(self.vendors.as_ref(), &mac);
        let scan_duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(%ip, open = open_ports.len(), scan_duration_ms, "host enriched");

        HostResult {
            ip,
            hostname: hostname.filter(|h| !h.is_empty()),
            mac: Some(mac).filter(|m| !m.is_empty()),
            vendor: Some(vendor).filter(|v| !v.is_empty()),
            ping_ms: None,
            open_ports,
            scan_started,
            scan_duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{NoopResolver, PortProber};
    use crate::types::{DiscoveryMode, TargetSpec};
    use crate::vendor::MemoryOui;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ClosedProber;

    #[async_trait]
    impl PortProber for ClosedProber {
        async fn probe(&self, _ip: IpAddr, _port: u16, _timeout: Duration) -> bool {
            false
        }
    }

    /// Resolver that tracks how many lookups overlap.
    #[derive(Default)]
    struct GaugeResolver {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl HostnameResolver for GaugeResolver {
        async fn reverse(&self, _ip: IpAddr) -> Option<String> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Some("host.lan".to_string())
        }
    }

    fn config(ports: &[u16]) -> ScanConfig {
        ScanConfig {
            target: TargetSpec::parse("10.0.0.0/16").unwrap(),
            ports: ports.iter().filter_map(|&p| Port::new(p)).collect(),
            concurrency: 4,
            timeout: Duration::from_millis(50),
            discovery: DiscoveryMode::ArpRaw,
        }
    }

    fn many_hosts(count: u32) -> AddressMacMap {
        (0..count)
            .map(|i| (Ipv4Addr::from(0x0a00_0001 + i), String::new()))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_host_concurrency_bound() {
        let resolver = Arc::new(GaugeResolver::default());
        let coordinator = Coordinator::new(
            PortScanner::new(Arc::new(ClosedProber)),
            Arc::clone(&resolver) as Arc<dyn HostnameResolver>,
            Arc::new(MemoryOui::new()),
        );
        assert_eq!(coordinator.max_hosts(), DEFAULT_MAX_HOSTS);

        let results = coordinator.enrich(many_hosts(500), &config(&[22]), None).await;
        assert_eq!(results.len(), 500);
        let peak = resolver.peak.load(Ordering::SeqCst);
        assert!(peak <= DEFAULT_MAX_HOSTS, "peak {peak} exceeded bound");
        assert!(peak > 1);
    }

    #[tokio::test]
    async fn test_custom_host_bound() {
        let resolver = Arc::new(GaugeResolver::default());
        let coordinator = Coordinator::new(
            PortScanner::new(Arc::new(ClosedProber)),
            Arc::clone(&resolver) as Arc<dyn HostnameResolver>,
            Arc::new(MemoryOui::new()),
        )
        .with_max_hosts(3);

        let results = coordinator.enrich(many_hosts(20), &config(&[]), None).await;
        assert_eq!(results.len(), 20);
        assert!(resolver.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_mac_and_vendor_consistency() {
        let coordinator = Coordinator::new(
            PortScanner::new(Arc::new(ClosedProber)),
            Arc::new(NoopResolver),
            Arc::new(MemoryOui::default_seed()),
        );
        let known = Ipv4Addr::new(10, 0, 0, 1);
        let unknown_vendor = Ipv4Addr::new(10, 0, 0, 2);
        let no_mac = Ipv4Addr::new(10, 0, 0, 3);
        let hosts = AddressMacMap::from([
            (known, "bc:24:11:aa:bb:cc".to_string()),
            (unknown_vendor, "02:00:00:00:00:01".to_string()),
            (no_mac, String::new()),
        ]);

        let results = coordinator.enrich(hosts, &config(&[22]), None).await;
        let by_ip = |ip| results.iter().find(|r| r.ip == ip).unwrap();

        let r = by_ip(known);
        assert_eq!(r.mac.as_deref(), Some("bc:24:11:aa:bb:cc"));
        assert_eq!(r.vendor.as_deref(), Some("Proxmox Server Solutions GmbH"));

        let r = by_ip(unknown_vendor);
        assert!(r.mac.is_some());
        assert_eq!(r.vendor, None);

        let r = by_ip(no_mac);
        assert_eq!(r.mac, None);
        assert_eq!(r.vendor, None);
        assert_eq!(r.hostname, None);
        assert_eq!(r.ping_ms, None);
    }

    #[tokio::test]
    async fn test_progress_tracks_hosts() {
        let coordinator = Coordinator::new(
            PortScanner::new(Arc::new(ClosedProber)),
            Arc::new(NoopResolver),
            Arc::new(MemoryOui::new()),
        );
        let pb = ProgressBar::hidden();
        coordinator.enrich(many_hosts(5), &config(&[80]), Some(&pb)).await;
        assert_eq!(pb.position(), 5);
        assert_eq!(pb.length(), Some(5));
    }

    #[test]
    fn test_host_result_json_omits_absent_fields() {
        let result = HostResult {
            ip: Ipv4Addr::new(10, 0, 0, 1),
            hostname: None,
            mac: Some("bc:24:11:aa:bb:cc".into()),
            vendor: None,
            ping_ms: None,
            open_ports: vec![22, 80],
            scan_started: "2024-05-01T12:00:00Z".parse().unwrap(),
            scan_duration_ms: 42,
        };
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["ip"], "10.0.0.1");
        assert_eq!(obj["mac"], "bc:24:11:aa:bb:cc");
        assert_eq!(obj["open_ports"], serde_json::json!([22, 80]));
        assert_eq!(obj["scan_started"], "2024-05-01T12:00:00Z");
        assert_eq!(obj["scan_duration_ms"], 42);
        for absent in ["hostname", "vendor", "ping_ms"] {
            assert!(!obj.contains_key(absent), "{absent} should be omitted");
        }
    }

    #[tokio::test]
    async fn test_collector_take_drains() {
        let collector = ResultCollector::new();
        assert!(collector.is_empty().await);
        collector
            .push(HostResult {
                ip: Ipv4Addr::new(10, 0, 0, 9),
                hostname: None,
                mac: None,
                vendor: None,
                ping_ms: None,
                open_ports: vec![],
                scan_started: Utc::now(),
                scan_duration_ms: 0,
            })
            .await;
        assert_eq!(collector.len().await, 1);
        assert_eq!(collector.take().await.len(), 1);
        assert!(collector.is_empty().await);
    }
}
