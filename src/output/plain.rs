//! Plain text output formatting.
//!
//! Produces a human-readable host table with colors.

use crate::scanner::HostResult;
use crate::types::ScanConfig;
use console::style;
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────────────────";

/// Write the host table to `out`, sorted by address.
pub fn write_plain<W: Write>(out: &mut W, results: &[HostResult], elapsed: Duration) -> io::Result<()> {
    let mut hosts: Vec<&HostResult> = results.iter().collect();
    hosts.sort_by_key(|h| h.ip);

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                         {} Scan Results", style("netscan").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    let open_total: usize = hosts.iter().map(|h| h.open_ports.len()).sum();
    writeln!(
        out,
        "  {} {} hosts up, {} open ports in {:.2}s",
        style("Statistics:").bold(),
        style(hosts.len()).green().bold(),
        style(open_total).green(),
        elapsed.as_secs_f64()
    )?;
    writeln!(out)?;

    if hosts.is_empty() {
        writeln!(out, "  {}", style("No hosts found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<15}  {:<17}  {:<24}  {}",
            style("ADDRESS").bold(),
            style("MAC").bold(),
            style("VENDOR").bold(),
            style("OPEN PORTS").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for host in hosts {
            let ports = if host.open_ports.is_empty() {
                style("-".to_string()).dim()
            } else {
                style(join_ports(&host.open_ports)).green()
            };
            writeln!(
                out,
                "  {:<15}  {:<17}  {:<24}  {}",
                host.ip,
                host.mac.as_deref().unwrap_or("-"),
                truncate_string(host.vendor.as_deref().unwrap_or("-"), 24),
                ports
            )?;
            if let Some(name) = &host.hostname {
                writeln!(out, "  {:<15}  {}", "", style(name).dim())?;
            }
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print the host table to stdout.
pub fn print_plain(results: &[HostResult], elapsed: Duration) -> io::Result<()> {
    write_plain(&mut io::stdout().lock(), results, elapsed)
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(config: &ScanConfig) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("netscan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Discovery: {}", style("•").dim(), style(config.discovery).yellow());
    println!(
        "{} Target: {} ({} candidates)",
        style("•").dim(),
        style(config.target).white().bold(),
        config.target.hosts().len()
    );
    println!(
        "{} Scanning {} ports per host...",
        style("•").dim(),
        style(config.ports.len()).white().bold()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Comma-separated port list.
pub(crate) fn join_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::net::Ipv4Addr;

    fn host(last: u8, ports: Vec<u16>, vendor: Option<&str>) -> HostResult {
        HostResult {
            ip: Ipv4Addr::new(192, 168, 1, last),
            hostname: None,
            mac: vendor.map(|_| "bc:24:11:aa:bb:cc".to_string()),
            vendor: vendor.map(str::to_string),
            ping_ms: None,
            open_ports: ports,
            scan_started: Utc::now(),
            scan_duration_ms: 5,
        }
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_join_ports() {
        assert_eq!(join_ports(&[22, 80, 443]), "22,80,443");
        assert_eq!(join_ports(&[]), "");
    }

    #[test]
    fn test_plain_table_sorted_by_address() {
        console::set_colors_enabled(false);
        let results = vec![
            host(20, vec![], None),
            host(3, vec![22, 80], Some("Proxmox Server Solutions GmbH")),
        ];
        let mut buf = Vec::new();
        write_plain(&mut buf, &results, Duration::from_millis(1500)).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("2 hosts up, 2 open ports in 1.50s"));
        let first = text.find("192.168.1.3").unwrap();
        let second = text.find("192.168.1.20").unwrap();
        assert!(first < second);
        assert!(text.contains("22,80"));
        assert!(text.contains("Proxmox Server Soluti..."));
    }

    #[test]
    fn test_plain_empty() {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write_plain(&mut buf, &[], Duration::ZERO).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No hosts found."));
    }
}
