//! CLI subcommand definitions and handlers.
//!
//! - `netscan scan <target>` - Discover hosts and scan their ports
//! - `netscan vendor <mac>` - Look up the vendor of a MAC address

mod scan;
mod vendor;

pub use scan::ScanCommand;
pub use vendor::VendorCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// netscan - LAN host discovery and TCP port scanner.
///
/// Finds live hosts with an ARP sweep (or the OS neighbor cache), then
/// scans each one for open TCP ports and identifies its hardware vendor.
#[derive(Parser, Debug)]
#[command(name = "netscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LAN host discovery and TCP port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH", env = "NETSCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Run the selected subcommand.
    pub async fn execute(&self) -> CliResult<()> {
        let settings = load_settings(self.config.as_deref())?;
        match &self.command {
            Commands::Scan(cmd) => cmd.execute(&settings, self.verbose, self.quiet).await,
            Commands::Vendor(cmd) => cmd.execute(&settings),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover hosts on a network and scan their ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Look up the vendor of a MAC address
    #[command(alias = "v")]
    Vendor(VendorCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

fn load_settings(path: Option<&Path>) -> CliResult<AppSettings> {
    Ok(match path {
        Some(path) => AppSettings::load_from(path)?,
        None => AppSettings::load()?,
    })
}
