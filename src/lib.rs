//! # netscan - LAN Host Discovery and Port Scanner
//!
//! netscan finds the live hosts on a local network segment, scans each one
//! for open TCP ports and enriches the results with reverse-DNS names and
//! hardware vendors derived from MAC address prefixes.
//!
//! ## Features
//!
//! - **Layer-2 Discovery**: raw ARP sweep or OS neighbor-cache inspection
//! - **TCP Fallback**: connect probes when no layer-2 information exists
//! - **Bounded Concurrency**: separate limits for hosts and per-host ports
//! - **Vendor Lookup**: IEEE `oui.csv` with a built-in fallback table
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use netscan::config::AppSettings;
//! use netscan::scanner::NetScanner;
//! use netscan::types::ScanRequest;
//! use netscan::vendor::MemoryOui;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = AppSettings::default();
//!     let scanner = NetScanner::from_settings(&settings, Arc::new(MemoryOui::default_seed()));
//!
//!     let request = ScanRequest::new("192.168.1.0/24").with_ports("1-1024");
//!     for host in scanner.run(&request).await.unwrap() {
//!         println!("{} {:?}", host.ip, host.open_ports);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Request, port and target types
//! - [`discovery`] - ARP sweep, neighbor cache and TCP fallback strategies
//! - [`scanner`] - Port scanning, reverse DNS and per-host enrichment
//! - [`vendor`] - OUI database and MAC vendor resolution
//! - [`config`] - Settings and XDG paths
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;
pub mod vendor;

// Re-export commonly used types
pub use discovery::{AddressMacMap, Discovery, DiscoveryStrategy};
pub use error::{CliError, ScanError};
pub use scanner::{HostResult, NetScanner, PortProber, PortScanner};
pub use types::{DiscoveryMode, Port, PortSpec, ScanConfig, ScanRequest, TargetSpec};
pub use vendor::{MemoryOui, VendorDatabase};
