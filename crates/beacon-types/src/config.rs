//! Endpoint configuration.
//!
//! Four logical settings exist: server port/path and client port/path. Each
//! defaults to disabled (port `-1`, empty path) unless set explicitly.

use crate::error::BeaconError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port value meaning "remote access disabled".
pub const DISABLED_PORT: i32 = -1;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> i32 {
    DISABLED_PORT
}

/// Where a directory becomes network-reachable, or where a client finds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host to bind (server) or connect to (client).
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port; [`DISABLED_PORT`] disables the endpoint, `0` picks an
    /// ephemeral port when binding.
    #[serde(default = "default_port")]
    pub port: i32,
    /// Path the connector is advertised under.
    #[serde(default)]
    pub path: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Endpoint {
    /// An endpoint on the default host.
    pub fn new(port: i32, path: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            port,
            path: path.into(),
        }
    }

    /// The disabled endpoint.
    pub fn disabled() -> Self {
        Self::new(DISABLED_PORT, "")
    }

    /// Replace the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Whether the endpoint is switched on.
    pub fn is_enabled(&self) -> bool {
        self.port != DISABLED_PORT
    }

    /// The TCP port, `None` when disabled.
    pub fn port_number(&self) -> Result<Option<u16>, BeaconError> {
        if !self.is_enabled() {
            return Ok(None);
        }
        u16::try_from(self.port).map(Some).map_err(|_| {
            BeaconError::Config(format!(
                "port {} is out of range (expected {DISABLED_PORT} or 0..=65535)",
                self.port
            ))
        })
    }

    /// Check the endpoint before it is used.
    pub fn validate(&self) -> Result<(), BeaconError> {
        self.port_number()?;
        if self.is_enabled() && self.host.is_empty() {
            return Err(BeaconError::Config("host must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_enabled() {
            write!(f, "{}:{}/{}", self.host, self.port, self.path)
        } else {
            f.write_str("disabled")
        }
    }
}

/// Complete remote-access configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Where the local directory is exposed.
    #[serde(default)]
    pub server: Endpoint,
    /// Where proxies connect to.
    #[serde(default)]
    pub client: Endpoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_disabled() {
        let config = BeaconConfig::default();
        assert!(!config.server.is_enabled());
        assert!(!config.client.is_enabled());
        assert_eq!(config.server.port, DISABLED_PORT);
        assert_eq!(config.server.path, "");
        assert_eq!(config.server.port_number().unwrap(), None);
    }

    #[test]
    fn test_port_range() {
        assert_eq!(Endpoint::new(9999, "jmxrmi").port_number().unwrap(), Some(9999));
        assert_eq!(Endpoint::new(0, "x").port_number().unwrap(), Some(0));
        assert!(Endpoint::new(70000, "x").validate().is_err());
        assert!(Endpoint::new(-2, "x").validate().is_err());
        assert!(Endpoint::new(1, "x").with_host("").validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BeaconConfig =
            serde_json::from_str(r#"{"server": {"port": 9999, "path": "jmxrmi"}}"#).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
        assert!(!config.client.is_enabled());
    }

    #[test]
    fn test_display() {
        assert_eq!(Endpoint::new(9999, "jmxrmi").to_string(), "127.0.0.1:9999/jmxrmi");
        assert_eq!(Endpoint::disabled().to_string(), "disabled");
    }
}
