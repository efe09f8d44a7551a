//! Kernel-specific error types.

use beacon_types::BeaconError;
use beacon_wire::ConnectorError;
use thiserror::Error;

/// Kernel error type wrapping the lower layers' errors.
#[derive(Error, Debug)]
pub enum KernelError {
    /// Registration, naming or configuration failure.
    #[error(transparent)]
    Beacon(#[from] BeaconError),

    /// The connector could not be started.
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// A proxy was requested from a module whose remote client is disabled.
    #[error("Remote client is disabled; configure a client port first")]
    RemoteClientDisabled,
}

/// Alias for kernel results.
pub type KernelResult<T> = Result<T, KernelError>;
