//! Request, port and target types.
//!
//! A [`ScanRequest`] is what callers send; [`ScanConfig`] is its validated
//! form, with the port spec resolved and the target parsed.

mod port;
mod request;
mod target;

pub use port::{Port, PortError, PortRange, PortSpec};
pub use request::{
    DiscoveryMode, ScanConfig, ScanRequest, DEFAULT_CONCURRENCY, DEFAULT_PORTS,
    DEFAULT_TIMEOUT_MS,
};
pub use target::{TargetError, TargetSpec};
