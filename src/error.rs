//! Error types for netscan.
//!
//! Uses `thiserror` for ergonomic error definitions. Only request-fatal
//! conditions are represented here; per-host failures (timeouts, refused
//! connections, DNS misses) are absorbed where they happen.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("invalid port specification: {0}")]
    InvalidPorts(#[from] PortError),

    #[error("no interface for subnet {0}")]
    NoInterface(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("raw socket error: {0}")]
    RawSocket(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while loading a vendor database.
#[derive(Error, Debug)]
pub enum VendorError {
    #[error("failed to open OUI database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read OUI header: {0}")]
    Header(#[from] csv::Error),

    #[error("OUI csv missing required columns (Assignment/Organization Name)")]
    MissingColumns,
}

/// Result type alias for vendor database operations.
pub type VendorResult<T> = Result<T, VendorError>;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for command handlers.
pub type CliResult<T> = Result<T, CliError>;
