//! Per-host port scanning with a bounded worker pool.

use super::traits::PortProber;
use crate::types::Port;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Worker count used when the caller asks for zero.
pub const DEFAULT_WORKERS: usize = 50;

/// Fans a port list out across concurrent probes for one host.
#[derive(Clone)]
pub struct PortScanner {
    prober: Arc<dyn PortProber>,
}

impl PortScanner {
    pub fn new(prober: Arc<dyn PortProber>) -> Self {
        Self { prober }
    }

    /// Scan `ports` on `ip` and return the open ones in ascending order.
    ///
    /// At most `workers` probes are in flight at once; `0` means
    /// [`DEFAULT_WORKERS`]. Every probe finishes before this returns.
    pub async fn scan(
        &self,
        ip: IpAddr,
        ports: &[Port],
        timeout: Duration,
        workers: usize,
    ) -> Vec<u16> {
        if ports.is_empty() {
            return Vec::new();
        }

        let workers = if workers == 0 { DEFAULT_WORKERS } else { workers };
        let semaphore = Arc::new(Semaphore::new(workers.min(ports.len())));
        let mut tasks = JoinSet::new();
        let mut open = Vec::new();

        for port in ports.iter().map(|p| p.as_u16()) {
            // Acquire before spawning so the set never holds more than
            // `workers` live tasks.
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let prober = Arc::clone(&self.prober);
            tasks.spawn(async move {
                let _permit = permit;
                prober.probe(ip, port, timeout).await.then_some(port)
            });

            while let Some(done) = tasks.try_join_next() {
                collect(done, &mut open);
            }
        }

        while let Some(done) = tasks.join_next().await {
            collect(done, &mut open);
        }

        open.sort_unstable();
        debug!(%ip, scanned = ports.len(), open = open.len(), "port scan complete");
        open
    }
}

fn collect(done: Result<Option<u16>, tokio::task::JoinError>, open: &mut Vec<u16>) {
    match done {
        Ok(Some(port)) => open.push(port),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "port probe task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::TcpConnectProber;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    fn ports(range: std::ops::RangeInclusive<u16>) -> Vec<Port> {
        range.filter_map(Port::new).collect()
    }

    /// Opens a fixed port set and tracks peak concurrency.
    #[derive(Default)]
    struct CountingProber {
        open: HashSet<u16>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl PortProber for CountingProber {
        async fn probe(&self, _ip: IpAddr, port: u16, _timeout: Duration) -> bool {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.open.contains(&port)
        }
    }

    #[tokio::test]
    async fn test_result_sorted_and_independent_of_workers() {
        let prober = Arc::new(CountingProber {
            open: HashSet::from([250, 22, 80, 139]),
            ..Default::default()
        });
        let scanner = PortScanner::new(prober);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let list = ports(1..=300);

        let one = scanner.scan(ip, &list, Duration::from_millis(10), 1).await;
        let fifty = scanner.scan(ip, &list, Duration::from_millis(10), 50).await;
        assert_eq!(one, vec![22, 80, 139, 250]);
        assert_eq!(one, fifty);
    }

    #[tokio::test]
    async fn test_worker_bound_respected() {
        let prober = Arc::new(CountingProber::default());
        let scanner = PortScanner::new(Arc::clone(&prober) as Arc<dyn PortProber>);

        scanner
            .scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &ports(1..=200), Duration::from_millis(10), 7)
            .await;
        assert!(prober.peak.load(Ordering::SeqCst) <= 7);
    }

    #[tokio::test]
    async fn test_zero_workers_uses_default() {
        let prober = Arc::new(CountingProber::default());
        let scanner = PortScanner::new(Arc::clone(&prober) as Arc<dyn PortProber>);

        scanner
            .scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &ports(1..=300), Duration::from_millis(10), 0)
            .await;
        let peak = prober.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= DEFAULT_WORKERS);
    }

    #[tokio::test]
    async fn test_empty_port_list() {
        let scanner = PortScanner::new(Arc::new(CountingProber::default()));
        let open = scanner
            .scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &[], Duration::from_millis(10), 10)
            .await;
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_loopback_listeners() {
        let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let a = first.local_addr().unwrap().port();
        let b = second.local_addr().unwrap().port();
        let list: Vec<Port> = [b, closed_port, a]
            .into_iter()
            .filter_map(Port::new)
            .collect();

        let scanner = PortScanner::new(Arc::new(TcpConnectProber::new()));
        let open = scanner
            .scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &list, Duration::from_millis(500), 4)
            .await;

        let mut expected = vec![a, b];
        expected.sort_unstable();
        assert_eq!(open, expected);
    }
}
