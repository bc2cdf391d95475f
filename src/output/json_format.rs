//! JSON output formatting.

use crate::scanner::HostResult;
use std::io::{self, Write};

/// Write results as a pretty-printed JSON array, in arrival order.
pub fn write_json<W: Write>(out: &mut W, results: &[HostResult]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results).map_err(io::Error::other)?;
    writeln!(out)
}

/// Print results in JSON format.
pub fn print_json(results: &[HostResult]) -> io::Result<()> {
    write_json(&mut io::stdout().lock(), results)
}
