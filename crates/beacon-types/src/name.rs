//! Qualified names: the `(domain, type)` key of a managed object.
//!
//! The string form is `domain:type=<type>`, e.g. `demo:type=Hello`. It is the
//! addressing key both inside a directory and on the wire, so it must survive
//! a `to_string` / `parse` round trip unchanged.

use crate::error::BeaconError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key property used in the string form.
const TYPE_KEY: &str = "type";

/// Globally unique key for a managed object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    domain: String,
    kind: String,
}

impl QualifiedName {
    /// Build a name from a domain and a type, validating both parts.
    pub fn new(domain: impl Into<String>, kind: impl Into<String>) -> Result<Self, BeaconError> {
        let domain = domain.into();
        let kind = kind.into();

        if domain.is_empty() {
            return Err(BeaconError::InvalidName("domain must not be empty".to_string()));
        }
        if domain.contains(':') {
            return Err(BeaconError::InvalidName(format!(
                "domain '{domain}' must not contain ':'"
            )));
        }
        if kind.is_empty() {
            return Err(BeaconError::InvalidName(format!(
                "type must not be empty (domain '{domain}')"
            )));
        }
        if kind.contains([':', '=', ',']) {
            return Err(BeaconError::InvalidName(format!(
                "type '{kind}' must not contain ':', '=' or ','"
            )));
        }

        Ok(Self { domain, kind })
    }

    /// The namespace part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The local identifier part (the `type=` property).
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.domain, TYPE_KEY, self.kind)
    }
}

impl FromStr for QualifiedName {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, properties) = s
            .split_once(':')
            .ok_or_else(|| BeaconError::InvalidName(format!("'{s}' has no ':' separator")))?;
        let (key, kind) = properties
            .split_once('=')
            .ok_or_else(|| BeaconError::InvalidName(format!("'{s}' has no key=value property")))?;
        if key != TYPE_KEY {
            return Err(BeaconError::InvalidName(format!(
                "'{s}' must use the '{TYPE_KEY}' key, found '{key}'"
            )));
        }
        Self::new(domain, kind)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = BeaconError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}
