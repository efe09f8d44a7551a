//! Managed objects for Beacon.
//!
//! A managed interface is declared once with [`managed_interface!`]. The
//! macro produces the async trait itself, the server-side dispatch that turns
//! `(method, args)` into a typed call, and a client-side [`Proxy`]
//! implementation that forwards every method through an
//! [`InvocationChannel`].
//!
//! ## Architecture
//!
//! - **Directory**: process-wide map of qualified name to managed object
//! - **ManagedObject**: dynamically invokable object stored in the directory
//! - **ManagedInterface**: compile-time description of one contract
//! - **Manageable**: capability marker naming the contracts a type exposes
//! - **ProxyHandle / Proxy**: local stand-ins for remote objects

pub mod codec;
pub mod directory;
mod macros;
pub mod managed;
pub mod proxy;

pub use beacon_types::{BeaconError, InterfaceDescriptor, InvocationError, QualifiedName};
pub use directory::{Directory, DirectoryEntry};
pub use managed::{
    bind, into_managed, Dispatcher, Implements, InterfaceBinding, Manageable, ManagedInterface,
    ManagedObject,
};
pub use proxy::{create_proxy, InvocationChannel, Proxy, ProxyHandle};

/// Re-exports used by the generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use async_trait::async_trait;
    pub use beacon_types::interface::{InterfaceDescriptor, MethodSignature, ParamSpec};
    pub use futures::future::BoxFuture;
    pub use serde_json::Value;
}
