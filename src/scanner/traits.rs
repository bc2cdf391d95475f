//! Probe and lookup abstractions.
//!
//! The scanning pipeline only talks to the network through these traits,
//! so the TCP prober and the DNS resolver can be swapped for test doubles.

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

/// Single-port liveness probe.
///
/// # Example
///
/// ```ignore
/// use netscan::scanner::{PortProber, TcpConnectProber};
///
/// async fn is_open<P: PortProber>(prober: &P, ip: IpAddr) -> bool {
///     prober.probe(ip, 22, Duration::from_millis(400)).await
/// }
/// ```
#[async_trait]
pub trait PortProber: Send + Sync {
    /// Whether `ip:port` accepted a connection within `timeout`.
    ///
    /// Timeouts and errors both count as closed.
    async fn probe(&self, ip: IpAddr, port: u16, timeout: Duration) -> bool;
}

/// Reverse name lookup.
#[async_trait]
pub trait HostnameResolver: Send + Sync {
    /// Best-effort PTR lookup; `None` on failure or when no name exists.
    async fn reverse(&self, ip: IpAddr) -> Option<String>;
}

/// Resolver that never returns a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

#[async_trait]
impl HostnameResolver for NoopResolver {
    async fn reverse(&self, _ip: IpAddr) -> Option<String> {
        None
    }
}
