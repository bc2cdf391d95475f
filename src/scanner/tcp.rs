//! TCP connect prober.
//!
//! Uses the operating system's socket API. No special privileges are
//! required; each probe completes (or abandons) a full handshake and the
//! connection is closed straight away.

use crate::scanner::traits::PortProber;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// TCP connect prober.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProber;

impl TcpConnectProber {
    /// Create a new TCP connect prober.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PortProber for TcpConnectProber {
    async fn probe(&self, ip: IpAddr, port: u16, connect_timeout: Duration) -> bool {
        let addr = SocketAddr::new(ip, port);

        match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(e)) => {
                trace!(%addr, error = %e, "connect failed");
                false
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let prober = TcpConnectProber::new();
        assert!(
            prober
                .probe(IpAddr::V4(Ipv4Addr::LOCALHOST), port, Duration::from_secs(1))
                .await
        );
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let prober = TcpConnectProber::new();
        assert!(
            !prober
                .probe(IpAddr::V4(Ipv4Addr::LOCALHOST), port, Duration::from_millis(200))
                .await
        );
    }
}
