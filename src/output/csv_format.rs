//! CSV output formatting.

use super::plain::join_ports;
use crate::scanner::HostResult;
use std::io::{self, Write};

/// Write results as CSV rows, sorted by address. Open ports are joined
/// with spaces inside one column.
pub fn write_csv<W: Write>(out: W, results: &[HostResult]) -> io::Result<()> {
    let mut hosts: Vec<&HostResult> = results.iter().collect();
    hosts.sort_by_key(|h| h.ip);

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "ip",
        "hostname",
        "mac",
        "vendor",
        "open_ports",
        "scan_started",
        "scan_duration_ms",
    ])?;

    for host in hosts {
        wtr.write_record([
            host.ip.to_string().as_str(),
            host.hostname.as_deref().unwrap_or(""),
            host.mac.as_deref().unwrap_or(""),
            host.vendor.as_deref().unwrap_or(""),
            join_ports(&host.open_ports).replace(',', " ").as_str(),
            host.scan_started.to_rfc3339().as_str(),
            host.scan_duration_ms.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print results in CSV format.
pub fn print_csv(results: &[HostResult]) -> io::Result<()> {
    write_csv(io::stdout().lock(), results)
}
