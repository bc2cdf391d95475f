//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory. Every
//! field is optional in the file; missing fields take their defaults.

use crate::discovery::DiscoveryOptions;
use crate::error::{ConfigError, ConfigResult};
use crate::scanner::DEFAULT_MAX_HOSTS;
use crate::types::{DEFAULT_CONCURRENCY, DEFAULT_PORTS, DEFAULT_TIMEOUT_MS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following the XDG Base Directory layout.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netscan)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/netscan), default OUI location
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories. Nothing is created on disk.
    pub fn resolve() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("org", "netscan", "netscan").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Where an OUI database is looked for when none is configured.
    pub fn default_oui_file(&self) -> PathBuf {
        self.data_dir.join("oui.csv")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port spec used when `--ports` is not given.
    pub default_ports: String,
    /// Per-host port-scan workers.
    pub default_concurrency: usize,
    /// Per-port connect timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Discovery mode name (`arp-raw` or `arp-cache`).
    pub default_discovery: String,
    /// IEEE `oui.csv` location.
    pub oui_path: Option<PathBuf>,
    /// Hosts enriched at once.
    pub max_concurrent_hosts: usize,
    /// ARP sweep listen window in milliseconds.
    pub sweep_timeout_ms: u64,
    /// Delay between the ping sweep and the neighbor table read.
    pub cache_settle_ms: u64,
    /// Hosts probed at once by the TCP fallback.
    pub fallback_concurrency: usize,
    /// Reverse DNS timeout in milliseconds.
    pub dns_timeout_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        let discovery = DiscoveryOptions::default();
        Self {
            default_ports: DEFAULT_PORTS.to_string(),
            default_concurrency: DEFAULT_CONCURRENCY,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            default_discovery: "arp-raw".to_string(),
            oui_path: None,
            max_concurrent_hosts: DEFAULT_MAX_HOSTS,
            sweep_timeout_ms: discovery.sweep_timeout.as_millis() as u64,
            cache_settle_ms: discovery.cache_settle.as_millis() as u64,
            fallback_concurrency: discovery.fallback_concurrency,
            dns_timeout_ms: 2000,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults when the file
    /// (or the config directory itself) does not exist.
    pub fn load() -> ConfigResult<Self> {
        let file = match Paths::resolve() {
            Ok(paths) => paths.settings_file(),
            Err(e) => {
                debug!(error = %e, "no config directory, using defaults");
                return Ok(Self::default());
            }
        };
        if !file.exists() {
            debug!(path = %file.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Discovery tunables derived from these settings.
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            sweep_timeout: Duration::from_millis(self.sweep_timeout_ms),
            cache_settle: Duration::from_millis(self.cache_settle_ms),
            fallback_concurrency: self.fallback_concurrency,
            ..DiscoveryOptions::default()
        }
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    /// The configured OUI database, or the default data-dir location when
    /// a file exists there.
    pub fn resolve_oui_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.oui_path {
            return Some(path.clone());
        }
        Paths::resolve()
            .ok()
            .map(|p| p.default_oui_file())
            .filter(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_ports, "1-1024");
        assert_eq!(settings.default_concurrency, 100);
        assert_eq!(settings.default_timeout_ms, 400);
        assert_eq!(settings.max_concurrent_hosts, 200);
        assert_eq!(settings.sweep_timeout_ms, 1200);
        assert_eq!(settings.cache_settle_ms, 500);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_ports": "all", "oui_path": "/srv/oui.csv"}}"#).unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.default_ports, "all");
        assert_eq!(settings.oui_path, Some(PathBuf::from("/srv/oui.csv")));
        assert_eq!(settings.default_concurrency, 100);
        assert_eq!(settings.resolve_oui_path(), Some(PathBuf::from("/srv/oui.csv")));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            AppSettings::load_from(file.path()),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("settings.json");
        assert!(matches!(
            AppSettings::load_from(&missing),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_discovery_options() {
        let settings = AppSettings {
            sweep_timeout_ms: 2000,
            cache_settle_ms: 100,
            fallback_concurrency: 32,
            ..AppSettings::default()
        };
        let opts = settings.discovery_options();
        assert_eq!(opts.sweep_timeout, Duration::from_millis(2000));
        assert_eq!(opts.cache_settle, Duration::from_millis(100));
        assert_eq!(opts.fallback_concurrency, 32);
        assert_eq!(opts.max_pings, DiscoveryOptions::default().max_pings);
    }
}
