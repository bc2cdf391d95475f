//! Target specification types with CIDR support.
//!
//! Provides target parsing supporting:
//! - Single IPv4 addresses (192.168.1.10)
//! - IPv4 CIDR notation (192.168.1.0/24)

use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("IPv6 targets are not supported: {0}")]
    Ipv6Unsupported(String),
    #[error("CIDR range too large: {0} addresses (max: {1})")]
    CidrTooLarge(u64, u64),
    #[error("target is empty")]
    Empty,
}

/// A target range for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IPv4 address.
    Single(Ipv4Addr),
    /// An IPv4 CIDR block.
    Cidr(Ipv4Network),
}

impl TargetSpec {
    /// Maximum number of addresses allowed in a CIDR block (a /16).
    pub const MAX_CIDR_HOSTS: u64 = 65536;

    /// Prefix used to pick an interface for a single-address target.
    const SINGLE_HOST_BLOCK_PREFIX: u8 = 24;

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return match ip {
                IpAddr::V4(v4) => Ok(Self::Single(v4)),
                IpAddr::V6(_) => Err(TargetError::Ipv6Unsupported(s.to_string())),
            };
        }

        if let Some((addr, _)) = s.split_once('/') {
            if addr.contains(':') {
                return Err(TargetError::Ipv6Unsupported(s.to_string()));
            }

            let network: Ipv4Network = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;

            let size = block_size(network);
            if size > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(size, Self::MAX_CIDR_HOSTS));
            }

            return Ok(Self::Cidr(network));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Candidate hosts for discovery.
    ///
    /// A block drops its first (network) and last (broadcast) address when it
    /// holds at least two addresses.
    pub fn hosts(&self) -> Vec<Ipv4Addr> {
        match self {
            Self::Single(ip) => vec![*ip],
            Self::Cidr(network) => {
                let mut ips: Vec<Ipv4Addr> = network.iter().collect();
                if ips.len() >= 2 {
                    ips.pop();
                    ips.remove(0);
                }
                ips
            }
        }
    }

    /// Block used to pick the outbound interface.
    ///
    /// For a single address this is the /24 that contains it.
    pub fn interface_block(&self) -> Ipv4Network {
        match self {
            Self::Cidr(network) => *network,
            Self::Single(ip) => {
                let mask = u32::MAX << (32 - u32::from(Self::SINGLE_HOST_BLOCK_PREFIX));
                let base = Ipv4Addr::from(u32::from(*ip) & mask);
                // a /24 prefix is always valid
                Ipv4Network::new(base, Self::SINGLE_HOST_BLOCK_PREFIX)
                    .unwrap_or_else(|_| Ipv4Network::from(*ip))
            }
        }
    }

    /// Whether `ip` is one of this target's candidate hosts.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        match self {
            Self::Single(single) => *single == ip,
            Self::Cidr(network) => {
                if !network.contains(ip) {
                    return false;
                }
                if block_size(*network) >= 2 {
                    ip != network.network() && ip != network.broadcast()
                } else {
                    true
                }
            }
        }
    }
}

fn block_size(network: Ipv4Network) -> u64 {
    1u64 << (32 - u32::from(network.prefix()))
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
        }
    }
}
