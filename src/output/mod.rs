//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::{print_json, write_json};
pub use plain::{print_error, print_plain, print_scan_header, print_warning, write_plain};

use crate::cli::OutputFormat;
use crate::scanner::HostResult;
use std::io;
use std::time::Duration;

/// Format and print scan results according to the specified format.
pub fn print_results(results: &[HostResult], format: OutputFormat, elapsed: Duration) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(results, elapsed),
        OutputFormat::Json => print_json(results),
        OutputFormat::Csv => print_csv(results),
    }
}
