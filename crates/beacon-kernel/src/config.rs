//! Configuration loading from `~/.beacon/config.toml` with defaults.
//!
//! ```toml
//! [server]
//! port = 9999
//! path = "jmxrmi"
//!
//! [client]
//! host = "10.0.0.5"
//! port = 9999
//! path = "jmxrmi"
//! ```

use beacon_types::BeaconConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load endpoint configuration from a TOML file, with defaults.
///
/// A missing, unreadable or malformed file is logged and yields the default
/// configuration (both endpoints disabled).
pub fn load_config(path: Option<&Path>) -> BeaconConfig {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return BeaconConfig::default();
    }

    let contents = match std::fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to read config file, using defaults"
            );
            return BeaconConfig::default();
        }
    };

    match toml::from_str::<BeaconConfig>(&contents) {
        Ok(config) => {
            info!(
                path = %config_path.display(),
                server = %config.server,
                client = %config.client,
                "Loaded configuration"
            );
            config
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to parse config, using defaults"
            );
            BeaconConfig::default()
        }
    }
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    beacon_home().join("config.toml")
}

/// Get the default Beacon home directory.
pub fn beacon_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".beacon")
}
