//! Wire protocol message types.
//!
//! All communication between a connector and its clients uses JSON-framed
//! messages over TCP. Each message is prefixed with a 4-byte big-endian
//! length header.

use beacon_types::{InterfaceDescriptor, QualifiedName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A wire protocol message (envelope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// Unique message ID. A response carries the ID of its request.
    pub id: String,
    /// Message variant.
    #[serde(flatten)]
    pub kind: WireMessageKind,
}

/// The different kinds of wire messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireMessageKind {
    /// Request from a client to the connector.
    #[serde(rename = "request")]
    Request(WireRequest),
    /// Response to a request.
    #[serde(rename = "response")]
    Response(WireResponse),
}

/// Request messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum WireRequest {
    /// Handshake: must be the first message on every connection.
    #[serde(rename = "handshake")]
    Handshake {
        /// The client's unique ID.
        client_id: String,
        /// The path the client expects the directory to be published under.
        path: String,
        /// Protocol version.
        protocol_version: u32,
    },
    /// Invoke a method on a published object.
    #[serde(rename = "invoke")]
    Invoke {
        /// Target object.
        object: QualifiedName,
        /// Method name.
        operation: String,
        /// Parameter types the caller expects the method to have.
        #[serde(default)]
        signature: Vec<String>,
        /// Positional arguments.
        #[serde(default)]
        args: Vec<Value>,
    },
    /// List every published object.
    #[serde(rename = "list")]
    List,
    /// Fetch the interface descriptor of one object.
    #[serde(rename = "describe")]
    Describe { object: QualifiedName },
    /// Ping to check if the connector is alive.
    #[serde(rename = "ping")]
    Ping,
}

/// Response messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum WireResponse {
    /// Handshake acknowledgement.
    #[serde(rename = "handshake_ack")]
    HandshakeAck {
        server_id: String,
        protocol_version: u32,
        /// Objects published at handshake time.
        objects: Vec<ObjectInfo>,
    },
    /// Result of a successful invocation.
    #[serde(rename = "invoke_result")]
    InvokeResult { value: Value },
    /// Listing results.
    #[serde(rename = "object_list")]
    ObjectList { objects: Vec<ObjectInfo> },
    /// Interface of a described object.
    #[serde(rename = "description")]
    Description { interface: InterfaceDescriptor },
    /// Pong response.
    #[serde(rename = "pong")]
    Pong {
        /// Seconds since the connector started listening.
        uptime_secs: u64,
    },
    /// Error response.
    #[serde(rename = "error")]
    Error {
        /// Error code, see [`beacon_types::codes`].
        code: i32,
        /// Error message.
        message: String,
    },
}

/// Summary of one published object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Qualified name the object is published under.
    pub name: QualifiedName,
    /// Full interface name (`namespace.Name`).
    pub interface: String,
}

/// Current protocol version.
pub const PROTOCOL_VERSION: u32 = 1;

/// Encode a wire message to bytes (4-byte big-endian length + JSON).
pub fn encode_message(msg: &WireMessage) -> Result<Vec<u8>, serde_json::Error> {
    let json = serde_json::to_vec(msg)?;
    let len = json.len() as u32;
    let mut bytes = Vec::with_capacity(4 + json.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(&json);
    Ok(bytes)
}

/// Decode the length prefix from a 4-byte header.
pub fn decode_length(header: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*header)
}

/// Parse a JSON body into a WireMessage.
pub fn decode_message(body: &[u8]) -> Result<WireMessage, serde_json::Error> {
    serde_json::from_slice(body)
}
