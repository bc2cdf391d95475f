//! Vendor lookup subcommand.

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::vendor::{self, normalize_oui, vendor_for_mac, VendorDatabase};
use clap::Parser;
use std::path::PathBuf;

/// Look up the hardware vendor for a MAC address.
#[derive(Parser, Debug)]
pub struct VendorCommand {
    /// MAC address in any common notation (aa:bb:cc:dd:ee:ff, AA-BB-CC..., aabb.ccdd.eeff)
    #[arg(value_name = "MAC")]
    pub mac: String,

    /// IEEE oui.csv used for vendor lookup
    #[arg(long, value_name = "PATH")]
    pub oui: Option<PathBuf>,
}

impl VendorCommand {
    /// Execute the vendor command.
    pub fn execute(&self, settings: &AppSettings) -> CliResult<()> {
        let path = self.oui.clone().or_else(|| settings.resolve_oui_path());
        let db = vendor::load_or_default(path.as_deref());
        println!("{}", self.lookup(&db)?);
        Ok(())
    }

    /// Resolve the vendor, or explain why nothing was found.
    pub fn lookup(&self, db: &dyn VendorDatabase) -> CliResult<String> {
        let Some(oui) = normalize_oui(&self.mac) else {
            return Err(CliError::Other(format!("'{}' is not a MAC address", self.mac)));
        };

        match vendor_for_mac(db, &self.mac) {
            name if name.is_empty() => Err(CliError::Other(format!(
                "no vendor registered for OUI {}",
                &oui[..6]
            ))),
            name => Ok(name),
        }
    }
}
