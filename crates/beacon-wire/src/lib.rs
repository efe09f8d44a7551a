//! Beacon wire protocol: remote access to a managed object directory.
//!
//! Serves a [`Directory`](beacon_runtime::Directory) over TCP and provides
//! the client-side invocation channel that proxies use to reach it.
//!
//! ## Architecture
//!
//! - **Connector**: lifecycle-managed listener that publishes one directory
//! - **RemoteChannel**: lazily connected client implementing `InvocationChannel`
//! - **WireMessage**: JSON-framed protocol messages

pub mod channel;
pub mod connector;
pub mod message;

pub use channel::RemoteChannel;
pub use connector::{Connector, ConnectorError, ConnectorState, StartOutcome, WireError};
pub use message::{WireMessage, WireRequest, WireResponse, PROTOCOL_VERSION};
