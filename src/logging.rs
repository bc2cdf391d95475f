//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Pick the default filter for the given verbosity flags.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (true, _) => "netscan=debug,info",
        (false, true) => "warn",
        (false, false) => "info",
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over the flags.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
