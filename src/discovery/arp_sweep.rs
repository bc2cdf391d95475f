//! Active ARP sweep.
//!
//! Broadcasts one who-has request per candidate host from the interface
//! attached to the target block, then collects replies until a fixed
//! deadline. Unanswered requests are never retried. The capture is not
//! promiscuous, and replies from outside the target are dropped.
//!
//! # Privileges Required
//!
//! Opening a datalink channel needs root (or `CAP_NET_RAW`).

use super::{AddressMacMap, DiscoveryStrategy};
use crate::error::{ScanError, ScanResult};
use crate::types::TargetSpec;
use async_trait::async_trait;
use ipnetwork::Ipv4Network;
use pnet::datalink::{self, Channel, DataLinkReceiver, DataLinkSender, MacAddr, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const ETH_HDR_LEN: usize = 14;
const ARP_LEN: usize = 28;
const ARP_FRAME_LEN: usize = ETH_HDR_LEN + ARP_LEN;

/// How long a single capture read may block before the deadline is rechecked.
const READ_POLL: Duration = Duration::from_millis(50);

/// ARP sweep discovery strategy.
#[derive(Debug, Clone, Copy)]
pub struct ArpSweep {
    timeout: Duration,
}

impl ArpSweep {
    /// Create a sweep that listens for replies for `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl DiscoveryStrategy for ArpSweep {
    fn name(&self) -> &'static str {
        "arp-raw"
    }

    async fn discover(&self, target: &TargetSpec) -> ScanResult<AddressMacMap> {
        let block = target.interface_block();
        let (iface, src_mac, src_ip) = select_interface(&datalink::interfaces(), block)?;
        let candidates = target.hosts();
        let timeout = self.timeout;
        let target = *target;

        info!(
            interface = %iface.name,
            source = %src_ip,
            hosts = candidates.len(),
            "starting ARP sweep"
        );

        tokio::task::spawn_blocking(move || {
            let (mut tx, mut rx) = open_channel(&iface)?;
            send_requests(tx.as_mut(), src_mac, src_ip, &candidates)?;
            Ok(collect_replies(rx.as_mut(), &target, timeout))
        })
        .await
        .map_err(|e| ScanError::RawSocket(format!("ARP sweep task failed: {e}")))?
    }
}

/// Pick the interface whose IPv4 address lies inside `block`.
///
/// Loopback, down and MAC-less interfaces are skipped.
pub(crate) fn select_interface(
    interfaces: &[NetworkInterface],
    block: Ipv4Network,
) -> ScanResult<(NetworkInterface, MacAddr, Ipv4Addr)> {
    interfaces
        .iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .find_map(|iface| {
            let mac = iface.mac.filter(|mac| *mac != MacAddr::zero())?;
            let ip = iface.ips.iter().find_map(|net| match net.ip() {
                IpAddr::V4(v4) if block.contains(v4) => Some(v4),
                _ => None,
            })?;
            Some((iface.clone(), mac, ip))
        })
        .ok_or_else(|| ScanError::NoInterface(block.to_string()))
}

/// Capture only frames addressed to this station, polling every `READ_POLL`.
fn channel_config() -> datalink::Config {
    datalink::Config {
        read_timeout: Some(READ_POLL),
        promiscuous: false,
        ..Default::default()
    }
}

fn open_channel(
    iface: &NetworkInterface,
) -> ScanResult<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)> {
    match datalink::channel(iface, channel_config()) {
        Ok(Channel::Ethernet(tx, rx)) => Ok((tx, rx)),
        Ok(_) => Err(ScanError::RawSocket(format!(
            "unsupported channel type on {}",
            iface.name
        ))),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(ScanError::PermissionDenied(
            format!("raw access to {} requires root privileges", iface.name),
        )),
        Err(e) => Err(ScanError::RawSocket(e.to_string())),
    }
}

fn send_requests(
    tx: &mut dyn DataLinkSender,
    src_mac: MacAddr,
    src_ip: Ipv4Addr,
    candidates: &[Ipv4Addr],
) -> ScanResult<()> {
    let mut sent = 0usize;
    for &target in candidates {
        let frame = build_request(src_mac, src_ip, target)?;
        match tx.send_to(&frame, None) {
            Some(Ok(())) => sent += 1,
            Some(Err(e)) => debug!(%target, error = %e, "failed to send ARP request"),
            None => debug!(%target, "datalink sender refused ARP request"),
        }
    }
    debug!(sent, "ARP requests sent");
    Ok(())
}

/// Read replies until `timeout` elapses or the capture fails.
///
/// A later reply for the same address replaces the earlier one.
fn collect_replies(
    rx: &mut dyn DataLinkReceiver,
    target: &TargetSpec,
    timeout: Duration,
) -> AddressMacMap {
    let deadline = Instant::now() + timeout;
    let mut hosts = AddressMacMap::new();

    while Instant::now() < deadline {
        match rx.next() {
            Ok(frame) => match parse_reply(frame) {
                Some((ip, mac)) if target.contains(ip) => {
                    hosts.insert(ip, mac.to_string());
                }
                Some((ip, _)) => debug!(%ip, "ignoring ARP reply from outside the target"),
                None => {}
            },
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                warn!(error = %e, "capture failed, returning replies collected so far");
                break;
            }
        }
    }

    hosts
}

/// Build a broadcast who-has frame for `target_ip`.
pub(crate) fn build_request(
    src_mac: MacAddr,
    src_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> ScanResult<[u8; ARP_FRAME_LEN]> {
    let mut buffer = [0u8; ARP_FRAME_LEN];

    {
        let mut eth = MutableEthernetPacket::new(&mut buffer)
            .ok_or_else(|| ScanError::RawSocket("failed to build ethernet header".to_string()))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }

    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..])
        .ok_or_else(|| ScanError::RawSocket("failed to build ARP packet".to_string()))?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_sender_proto_addr(src_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target_ip);

    Ok(buffer)
}

/// Extract the responder's address pair from an ARP reply frame.
pub(crate) fn parse_reply(frame: &[u8]) -> Option<(Ipv4Addr, MacAddr)> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }

    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }

    Some((arp.get_sender_proto_addr(), arp.get_sender_hw_addr()))
}
