//! Scan subcommand implementation.
//!
//! Handles the `netscan scan <target>` command.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::NetScanner;
use crate::types::{DiscoveryMode, ScanConfig, ScanRequest};
use crate::vendor;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Discover hosts on a network and scan their open TCP ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IPv4 address or CIDR block)
    ///
    /// Examples:
    ///   192.168.1.10       Single address
    ///   192.168.1.0/24     CIDR range
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan ("all", "1-1024" or a single port)
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Concurrent port probes per host
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Connect timeout in milliseconds
    #[arg(short = 't', long = "timeout")]
    pub timeout_ms: Option<u64>,

    /// Discovery mode: arp-raw (ARP sweep) or arp-cache (neighbor table)
    #[arg(short = 'd', long)]
    pub discovery: Option<String>,

    /// IEEE oui.csv used for vendor lookup
    #[arg(long, value_name = "PATH")]
    pub oui: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ScanCommand {
    /// Merge flags over the loaded settings.
    pub fn to_request(&self, settings: &AppSettings) -> ScanRequest {
        ScanRequest::new(self.target.clone())
            .with_ports(self.ports.clone().unwrap_or_else(|| settings.default_ports.clone()))
            .with_concurrency(self.concurrency.unwrap_or(settings.default_concurrency))
            .with_timeout_ms(self.timeout_ms.unwrap_or(settings.default_timeout_ms))
            .with_discovery(
                self.discovery
                    .clone()
                    .unwrap_or_else(|| settings.default_discovery.clone()),
            )
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, verbose: bool, quiet: bool) -> CliResult<()> {
        let config = ScanConfig::try_from(self.to_request(settings))?;
        let plain = self.output == OutputFormat::Plain;

        if config.discovery == DiscoveryMode::ArpRaw && !is_root() {
            output::print_warning("ARP sweep needs root/sudo privileges for raw socket access.");
            output::print_warning("Try --discovery arp-cache when running unprivileged.");
        }

        let oui_path = self.oui.clone().or_else(|| settings.resolve_oui_path());
        let vendors = Arc::new(vendor::load_or_default(oui_path.as_deref()));

        let mut scanner = NetScanner::from_settings(settings, vendors);
        if verbose && plain {
            scanner = scanner.with_progress(host_progress());
        }

        if !quiet && plain {
            output::print_scan_header(&config);
        }

        let started = Instant::now();
        let results = scanner.run_config(&config).await?;
        output::print_results(&results, self.output, started.elapsed())?;

        Ok(())
    }
}

fn host_progress() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} hosts {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
