//! Passive neighbor-cache discovery.
//!
//! Pings every candidate so the kernel resolves its hardware address, waits
//! a fixed settle delay, then reads the OS neighbor table. Probe results are
//! never inspected; probes still in flight when the table is read are
//! dropped.

use super::{AddressMacMap, DiscoveryStrategy};
use crate::error::ScanResult;
use crate::types::TargetSpec;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info};

/// Upper bound for one neighbor-table command.
const TABLE_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Neighbor-cache discovery strategy.
#[derive(Debug, Clone, Copy)]
pub struct NeighborCache {
    settle: Duration,
    ping_timeout: Duration,
    max_pings: usize,
}

impl NeighborCache {
    /// Create the strategy.
    ///
    /// # Arguments
    /// * `settle` - delay between launching pings and reading the table
    /// * `ping_timeout` - hard limit for one ping process
    /// * `max_pings` - ping processes allowed to run at once
    pub fn new(settle: Duration, ping_timeout: Duration, max_pings: usize) -> Self {
        Self {
            settle,
            ping_timeout,
            max_pings: max_pings.max(1),
        }
    }
}

#[async_trait]
impl DiscoveryStrategy for NeighborCache {
    fn name(&self) -> &'static str {
        "arp-cache"
    }

    async fn discover(&self, target: &TargetSpec) -> ScanResult<AddressMacMap> {
        let candidates = target.hosts();
        info!(hosts = candidates.len(), "pinging candidates to warm the neighbor cache");

        let permits = Arc::new(Semaphore::new(self.max_pings));
        let mut probes = JoinSet::new();
        for ip in candidates {
            let permits = Arc::clone(&permits);
            let limit = self.ping_timeout;
            probes.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                ping(ip, limit).await;
            });
        }

        tokio::time::sleep(self.settle).await;
        let table = read_neighbor_table().await;
        probes.abort_all();

        let hosts = keep_targets(table, target);
        debug!(hosts = hosts.len(), "neighbor cache entries inside target");
        Ok(hosts)
    }
}

/// Drop neighbor entries that are not candidates of `target`.
fn keep_targets(table: AddressMacMap, target: &TargetSpec) -> AddressMacMap {
    table
        .into_iter()
        .filter(|(ip, _)| target.contains(*ip))
        .collect()
}

/// Send one echo request through the system `ping` binary.
async fn ping(ip: Ipv4Addr, limit: Duration) {
    let mut cmd = Command::new("ping");
    if cfg!(windows) {
        cmd.args(["-n", "1", "-w", "1000"]);
    } else {
        cmd.args(["-c", "1", "-W", "1"]);
    }
    cmd.arg(ip.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let _ = timeout(limit, cmd.status()).await;
}

/// Read the OS neighbor table.
///
/// Uses `ip neigh` on Linux and `arp -a` elsewhere (or when `ip` is
/// unavailable). Returns an empty map when neither can be read.
pub async fn read_neighbor_table() -> AddressMacMap {
    if cfg!(target_os = "linux") {
        if let Some(out) = run_table_command("ip", &["neigh"]).await {
            return parse_ip_neigh(&out);
        }
    }

    match run_table_command("arp", &["-a"]).await {
        Some(out) => parse_arp_a(&out),
        None => AddressMacMap::new(),
    }
}

async fn run_table_command(program: &str, args: &[&str]) -> Option<String> {
    let output = timeout(
        TABLE_READ_TIMEOUT,
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .ok()?
    .ok()?;

    if !output.status.success() {
        debug!(program, status = %output.status, "neighbor table command failed");
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `ip neigh` output.
///
/// ```text
/// 192.168.1.1 dev eth0 lladdr aa:bb:cc:dd:ee:ff REACHABLE
/// ```
pub fn parse_ip_neigh(output: &str) -> AddressMacMap {
    let mut table = AddressMacMap::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }
        let Ok(ip) = fields[0].parse::<Ipv4Addr>() else {
            continue;
        };
        let mac = fields
            .iter()
            .position(|f| *f == "lladdr")
            .and_then(|i| fields.get(i + 1))
            .and_then(|raw| normalize_mac(raw));
        if let Some(mac) = mac {
            table.insert(ip, mac);
        }
    }

    table
}

/// Parse `arp -a` output in BSD/macOS or Windows layout.
///
/// ```text
/// ? (192.168.1.1) at aa:bb:cc:dd:ee:ff on en0 ifscope [ethernet]
///   192.168.1.1           aa-bb-cc-dd-ee-ff     dynamic
/// ```
pub fn parse_arp_a(output: &str) -> AddressMacMap {
    let mut table = AddressMacMap::new();

    for line in output.lines() {
        let entry = if line.contains('(') && line.contains(')') && line.contains(" at ") {
            parse_bsd_arp_line(line)
        } else {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(ip), Some(mac)) => ip
                    .parse::<Ipv4Addr>()
                    .ok()
                    .zip(normalize_mac(mac)),
                _ => None,
            }
        };

        if let Some((ip, mac)) = entry {
            table.insert(ip, mac);
        }
    }

    table
}

fn parse_bsd_arp_line(line: &str) -> Option<(Ipv4Addr, String)> {
    let open = line.find('(')?;
    let close = open + line[open..].find(')')?;
    let ip = line[open + 1..close].trim().parse::<Ipv4Addr>().ok()?;

    let rest = &line[close..];
    let at = rest.find(" at ")?;
    let mac = rest[at + 4..].split_whitespace().next()?;
    Some((ip, normalize_mac(mac)?))
}

/// Normalize a colon or hyphen separated MAC to lowercase colon form.
///
/// Accepts single-digit octets as printed by BSD `arp`. Returns `None` for
/// malformed and all-zero addresses.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let octets: Vec<u8> = raw
        .split([':', '-'])
        .map(|part| {
            if part.is_empty() || part.len() > 2 {
                return None;
            }
            u8::from_str_radix(part, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;

    if octets.len() != 6 || octets.iter().all(|&b| b == 0) {
        return None;
    }

    Some(
        octets
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":"),
    )
}
