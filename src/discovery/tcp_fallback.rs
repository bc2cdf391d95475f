//! TCP connect liveness fallback.
//!
//! Used when layer-2 discovery finds nothing (routed targets, missing
//! privileges, firewalled ARP). A host counts as alive when any probe port
//! accepts a connection; its MAC stays unknown.

use super::AddressMacMap;
use crate::scanner::PortProber;
use crate::types::{Port, TargetSpec};
use futures::stream::{self, StreamExt};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Well-known ports tried first, with their connect timeouts.
const WELL_KNOWN_PROBES: [(u16, Duration); 2] = [
    (80, Duration::from_millis(250)),
    (443, Duration::from_millis(250)),
];

/// Connect timeout for the first requested port.
const REQUESTED_PORT_TIMEOUT: Duration = Duration::from_millis(300);

/// TCP connect fallback discovery.
#[derive(Clone)]
pub struct TcpFallback {
    prober: Arc<dyn PortProber>,
    concurrency: usize,
}

impl TcpFallback {
    /// Create a fallback probing up to `concurrency` hosts at once.
    pub fn new(prober: Arc<dyn PortProber>, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every candidate host of `target`.
    ///
    /// Ports are tried in order (80, 443, then `first_port`) and the first
    /// accepted connection marks the host alive. Unreachable hosts are
    /// simply absent from the result.
    pub async fn discover(&self, target: &TargetSpec, first_port: Option<Port>) -> AddressMacMap {
        let plan: Vec<(u16, Duration)> = WELL_KNOWN_PROBES
            .into_iter()
            .chain(first_port.map(|p| (p.as_u16(), REQUESTED_PORT_TIMEOUT)))
            .collect();
        let plan = &plan;
        let prober = &self.prober;

        let alive: Vec<Ipv4Addr> = stream::iter(target.hosts())
            .map(|ip| async move {
                for &(port, timeout) in plan {
                    if prober.probe(IpAddr::V4(ip), port, timeout).await {
                        debug!(%ip, port, "host answered TCP probe");
                        return Some(ip);
                    }
                }
                None
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|ip| async move { ip })
            .collect()
            .await;

        alive.into_iter().map(|ip| (ip, String::new())).collect()
    }
}
