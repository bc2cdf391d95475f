//! Scan requests and their validated form.

use super::{Port, PortSpec, TargetSpec};
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Default port specification.
pub const DEFAULT_PORTS: &str = "1-1024";
/// Default per-host port-scan concurrency.
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Default per-port connect timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 400;

/// A scan request as received from the boundary.
///
/// Zero or empty fields mean "unset" and are replaced by the defaults
/// when the request is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Single IPv4 address or CIDR block.
    pub target: String,
    /// Port specification ("all", "a-b" or a single port).
    #[serde(default = "default_ports")]
    pub ports: String,
    /// Concurrent port probes per host.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-port connect timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Discovery mode ("arp-raw" or "arp-cache").
    #[serde(default)]
    pub discovery: String,
}

fn default_ports() -> String {
    DEFAULT_PORTS.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ScanRequest {
    /// Create a request for `target` with default parameters.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ports: default_ports(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            discovery: String::new(),
        }
    }

    /// Set the port specification.
    pub fn with_ports(mut self, ports: impl Into<String>) -> Self {
        self.ports = ports.into();
        self
    }

    /// Set the per-host port-scan concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-port timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the discovery mode.
    pub fn with_discovery(mut self, discovery: impl Into<String>) -> Self {
        self.discovery = discovery.into();
        self
    }
}

/// Host discovery technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMode {
    /// Active ARP sweep over a raw datalink channel.
    #[default]
    ArpRaw,
    /// Ping each candidate, then read the OS neighbor cache.
    ArpCache,
}

impl DiscoveryMode {
    /// Map a request value onto a mode.
    ///
    /// Only `"arp-cache"` selects the neighbor cache; anything else falls
    /// back to the ARP sweep.
    pub fn from_request(value: &str) -> Self {
        match value.trim() {
            "arp-cache" => Self::ArpCache,
            "" | "arp-raw" => Self::ArpRaw,
            other => {
                warn!(mode = other, "unrecognized discovery mode, using arp-raw");
                Self::ArpRaw
            }
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArpRaw => write!(f, "arp-raw"),
            Self::ArpCache => write!(f, "arp-cache"),
        }
    }
}

/// A validated, immutable scan request.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: TargetSpec,
    pub ports: Vec<Port>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub discovery: DiscoveryMode,
}

impl TryFrom<&ScanRequest> for ScanConfig {
    type Error = ScanError;

    fn try_from(request: &ScanRequest) -> Result<Self, Self::Error> {
        let ports_str = if request.ports.trim().is_empty() {
            DEFAULT_PORTS
        } else {
            request.ports.as_str()
        };
        let ports = ports_str.parse::<PortSpec>()?.to_ports();
        let target = TargetSpec::parse(&request.target)?;

        let concurrency = match request.concurrency {
            0 => DEFAULT_CONCURRENCY,
            n => n,
        };
        let timeout_ms = match request.timeout_ms {
            0 => DEFAULT_TIMEOUT_MS,
            n => n,
        };

        Ok(Self {
            target,
            ports,
            concurrency,
            timeout: Duration::from_millis(timeout_ms),
            discovery: DiscoveryMode::from_request(&request.discovery),
        })
    }
}

impl TryFrom<ScanRequest> for ScanConfig {
    type Error = ScanError;

    fn try_from(request: ScanRequest) -> Result<Self, Self::Error> {
        Self::try_from(&request)
    }
}
