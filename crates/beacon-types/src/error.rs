//! Shared error types for Beacon.

use crate::name::QualifiedName;
use thiserror::Error;

/// Numeric codes carried by wire-level error responses.
pub mod codes {
    /// The peer speaks a different protocol version.
    pub const VERSION_MISMATCH: i32 = 1;
    /// Malformed request or arguments that do not match the method.
    pub const BAD_REQUEST: i32 = 400;
    /// A request arrived before the handshake.
    pub const HANDSHAKE_REQUIRED: i32 = 401;
    /// Unknown managed object or connector path.
    pub const NOT_FOUND: i32 = 404;
    /// Unknown method, or a signature that does not match the interface.
    pub const UNKNOWN_METHOD: i32 = 405;
    /// The managed object's method returned an error.
    pub const APPLICATION: i32 = 500;
}

/// Directory and configuration errors.
#[derive(Error, Debug)]
pub enum BeaconError {
    /// A managed object is already registered under this name.
    #[error("Managed object already registered: {0}")]
    Conflict(QualifiedName),

    /// No managed object is registered under this name.
    #[error("Managed object not found: {0}")]
    NotFound(QualifiedName),

    /// The implementation type declares no manageable interface.
    #[error("No manageable interface declared by {implementation}")]
    NoInterfaceFound {
        /// Rust type name of the implementation.
        implementation: String,
    },

    /// The implementation type declares several manageable interfaces.
    #[error(
        "{implementation} declares {} manageable interfaces ({}); register it with an explicit interface",
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousInterface {
        /// Rust type name of the implementation.
        implementation: String,
        /// Names of every declared interface.
        candidates: Vec<String>,
    },

    /// A domain or type is not a valid qualified-name component.
    #[error("Invalid qualified name: {0}")]
    InvalidName(String),

    /// The resolver had no instance for an implementation type.
    #[error("No instance bound for {implementation} (needed by {name})")]
    Unresolved {
        /// Rust type name of the implementation.
        implementation: String,
        /// The name the instance would have been published under.
        name: QualifiedName,
    },

    /// A configuration value is out of range.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a single call through a proxy or invocation channel.
///
/// Callers can branch on the kind: [`InvocationError::is_transient`] is true
/// only when the remote object could not be reached at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The invocation channel could not reach the remote directory.
    #[error("Remote object unreachable: {0}")]
    Unreachable(String),

    /// The remote side refused the call.
    #[error("Invocation rejected ({code}): {message}")]
    Rejected {
        /// One of [`codes`].
        code: i32,
        /// Human-readable reason.
        message: String,
    },

    /// The managed object's method itself failed.
    #[error("Remote method failed: {0}")]
    Application(String),

    /// An argument or result could not be converted.
    #[error("Marshalling failed: {0}")]
    Marshal(String),
}

impl InvocationError {
    /// Build an application-level failure. Managed object implementations
    /// return this for their own errors.
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application(message.into())
    }

    /// Build a rejection with an explicit code.
    pub fn rejected(code: i32, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Rejection for a method the interface does not declare.
    pub fn unknown_method(method: &str) -> Self {
        Self::rejected(codes::UNKNOWN_METHOD, format!("Unknown method '{method}'"))
    }

    /// Rejection for a name that is not in the directory.
    pub fn not_found(name: &QualifiedName) -> Self {
        Self::rejected(codes::NOT_FOUND, format!("Managed object not found: {name}"))
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// The reason without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Unreachable(m) | Self::Application(m) | Self::Marshal(m) => m,
            Self::Rejected { message, .. } => message,
        }
    }

    /// Wire code used when this failure is sent back to a caller.
    pub fn code(&self) -> i32 {
        match self {
            Self::Unreachable(_) | Self::Application(_) => codes::APPLICATION,
            Self::Rejected { code, .. } => *code,
            Self::Marshal(_) => codes::BAD_REQUEST,
        }
    }
}
