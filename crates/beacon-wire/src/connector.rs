//! Connector: TCP server that publishes a managed object directory.
//!
//! A [`Connector`] owns the lifecycle of one listener. `start()` binds the
//! configured endpoint and spawns an accept loop; every accepted connection
//! must open with a handshake naming the published path, then enters a
//! request loop that serves `invoke`, `list`, `describe` and `ping` live
//! against the directory. `stop()` signals every task through a watch
//! channel and joins the accept loop, releasing the port.

use crate::message::*;

use beacon_runtime::{Directory, InvocationChannel};
use beacon_types::{codes, BeaconError, Endpoint, QualifiedName};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Errors from the wire protocol layer.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: u32, max: u32 },
    #[error("Protocol version mismatch: local={local}, remote={remote}")]
    VersionMismatch { local: u32, remote: u32 },
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Errors from connector lifecycle operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The endpoint could not be bound. The connector is left unstarted.
    #[error("Failed to bind connector endpoint {address}: {source}")]
    EndpointBind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    /// `start()` was called while a listener is already running.
    #[error("Connector already running on {address}")]
    AlreadyRunning { address: SocketAddr },
    /// The connector was stopped and cannot be restarted.
    #[error("Connector has been stopped")]
    Stopped,
    /// The endpoint configuration is out of range.
    #[error("Invalid connector endpoint: {0}")]
    InvalidEndpoint(#[from] BeaconError),
}

/// Maximum single message size (16 MB).
pub const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    Unstarted,
    Starting,
    Running,
    /// Terminal.
    Stopped,
}

impl std::fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unstarted => "unstarted",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// What a successful `start()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A listener is accepting connections on this address.
    Listening(SocketAddr),
    /// The directory is empty; nothing was bound.
    NothingPublished,
    /// The endpoint port is disabled; nothing was bound.
    RemoteDisabled,
}

enum Lifecycle {
    Unstarted,
    Running(RunningListener),
    Stopped,
}

struct RunningListener {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

#[derive(Debug, Clone)]
struct Observed {
    state: ConnectorState,
    local_addr: Option<SocketAddr>,
    path: Option<String>,
}

/// Shared by the accept loop and every connection task.
struct ServeContext {
    directory: Arc<Directory>,
    server_id: String,
    path: String,
    started: Instant,
}

/// Lifecycle-managed listener publishing one directory.
pub struct Connector {
    directory: Arc<Directory>,
    server_id: String,
    /// Serializes `start()` and `stop()`.
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    observed: Mutex<Observed>,
}

impl Connector {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            directory,
            server_id: uuid::Uuid::new_v4().to_string(),
            lifecycle: tokio::sync::Mutex::new(Lifecycle::Unstarted),
            observed: Mutex::new(Observed {
                state: ConnectorState::Unstarted,
                local_addr: None,
                path: None,
            }),
        }
    }

    /// The directory this connector publishes.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// This server's unique ID, sent in every handshake acknowledgement.
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn state(&self) -> ConnectorState {
        self.observe().state
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.observe().local_addr
    }

    /// Published path while running.
    pub fn path(&self) -> Option<String> {
        self.observe().path
    }

    fn observe(&self) -> Observed {
        self.observed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_observed(&self, state: ConnectorState, local_addr: Option<SocketAddr>, path: Option<String>) {
        let mut observed = self.observed.lock().unwrap_or_else(|e| e.into_inner());
        *observed = Observed {
            state,
            local_addr,
            path,
        };
    }

    /// Start listening on `endpoint`.
    ///
    /// Concurrent calls are serialized; at most one listener ever exists.
    pub async fn start(&self, endpoint: &Endpoint) -> Result<StartOutcome, ConnectorError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Running(listener) => {
                return Err(ConnectorError::AlreadyRunning {
                    address: listener.local_addr,
                });
            }
            Lifecycle::Stopped => return Err(ConnectorError::Stopped),
            Lifecycle::Unstarted => {}
        }

        if self.directory.is_empty() {
            info!("Connector: directory is empty, nothing to publish");
            return Ok(StartOutcome::NothingPublished);
        }
        endpoint.validate()?;
        let port = match endpoint.port_number()? {
            Some(port) => port,
            None => {
                debug!("Connector: remote access disabled");
                return Ok(StartOutcome::RemoteDisabled);
            }
        };

        self.set_observed(ConnectorState::Starting, None, None);
        let address = format!("{}:{}", endpoint.host, port);
        let listener = match bind(&endpoint.host, port).await {
            Ok(listener) => listener,
            Err(source) => {
                self.set_observed(ConnectorState::Unstarted, None, None);
                error!(address = %address, error = %source, "Connector: bind failed");
                return Err(ConnectorError::EndpointBind { address, source });
            }
        };

        let local_addr = listener.local_addr;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctx = Arc::new(ServeContext {
            directory: Arc::clone(&self.directory),
            server_id: self.server_id.clone(),
            path: endpoint.path.clone(),
            started: Instant::now(),
        });
        let accept_task = tokio::spawn(accept_loop(listener.inner, ctx, shutdown_rx));

        info!(
            address = %local_addr,
            path = %endpoint.path,
            objects = self.directory.len(),
            "Connector: listening"
        );
        *lifecycle = Lifecycle::Running(RunningListener {
            local_addr,
            shutdown_tx,
            accept_task,
        });
        self.set_observed(
            ConnectorState::Running,
            Some(local_addr),
            Some(endpoint.path.clone()),
        );
        Ok(StartOutcome::Listening(local_addr))
    }

    /// Stop the listener. Returns `true` if one was running.
    ///
    /// The port is released by the time this returns. Connections that are
    /// already open finish the request in flight and then close.
    pub async fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        let listener = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running(listener) => listener,
            other => {
                *lifecycle = other;
                return false;
            }
        };

        let _ = listener.shutdown_tx.send(true);
        if let Err(e) = listener.accept_task.await {
            warn!(error = %e, "Connector: accept loop ended abnormally");
        }
        self.set_observed(ConnectorState::Stopped, None, None);
        info!(address = %listener.local_addr, "Connector: stopped");
        true
    }
}

struct BoundListener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

async fn bind(host: &str, port: u16) -> std::io::Result<BoundListener> {
    let inner = TcpListener::bind((host, port)).await?;
    let local_addr = inner.local_addr()?;
    Ok(BoundListener { inner, local_addr })
}

/// Accept loop: runs in a spawned task until shutdown is signalled.
/// Dropping the listener on return releases the port.
async fn accept_loop(
    listener: TcpListener,
    ctx: Arc<ServeContext>,
    mut shutdown: watch::Receiver<bool>,
) {
    let connection_shutdown = shutdown.clone();
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "Connector: accepted connection");
                    let ctx = Arc::clone(&ctx);
                    let shutdown = connection_shutdown.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_inbound(stream, addr, &ctx, shutdown).await {
                            debug!(peer = %addr, error = %e, "Connector: connection ended");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Connector: accept error");
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
            },
        }
    }
}

/// Handle a single inbound connection: handshake, then the request loop.
async fn handle_inbound(
    stream: TcpStream,
    addr: SocketAddr,
    ctx: &ServeContext,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), WireError> {
    let (mut reader, mut writer) = stream.into_split();

    let msg = tokio::select! {
        biased;
        _ = shutdown.changed() => return Ok(()),
        msg = read_message(&mut reader) => msg?,
    };
    let client_id = match &msg.kind {
        WireMessageKind::Request(WireRequest::Handshake {
            client_id,
            path,
            protocol_version,
        }) => {
            if *protocol_version != PROTOCOL_VERSION {
                let message = format!(
                    "Protocol version mismatch: expected {}, got {}",
                    PROTOCOL_VERSION, protocol_version
                );
                write_message(&mut writer, &error_reply(&msg.id, codes::VERSION_MISMATCH, message))
                    .await?;
                return Err(WireError::VersionMismatch {
                    local: PROTOCOL_VERSION,
                    remote: *protocol_version,
                });
            }
            if *path != ctx.path {
                let message = format!("No directory published at path '{path}'");
                write_message(&mut writer, &error_reply(&msg.id, codes::NOT_FOUND, message))
                    .await?;
                return Err(WireError::HandshakeFailed(format!(
                    "client {client_id} asked for unknown path '{path}'"
                )));
            }

            let ack = WireMessage {
                id: msg.id.clone(),
                kind: WireMessageKind::Response(WireResponse::HandshakeAck {
                    server_id: ctx.server_id.clone(),
                    protocol_version: PROTOCOL_VERSION,
                    objects: list_objects(&ctx.directory),
                }),
            };
            write_message(&mut writer, &ack).await?;
            info!(client = %client_id, peer = %addr, "Connector: handshake complete");
            client_id.clone()
        }
        _ => {
            warn!(peer = %addr, "Connector: rejected request before handshake");
            write_message(
                &mut writer,
                &error_reply(
                    &msg.id,
                    codes::HANDSHAKE_REQUIRED,
                    "Handshake required: send a handshake before any request".to_string(),
                ),
            )
            .await?;
            return Err(WireError::HandshakeFailed(
                "Rejected request before handshake".into(),
            ));
        }
    };

    loop {
        let body = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                debug!(client = %client_id, "Connector: closing connection on shutdown");
                return Ok(());
            }
            frame = read_frame(&mut reader) => match frame {
                Ok(body) => body,
                Err(WireError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e),
            },
        };
        let msg = match decode_message(&body) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(client = %client_id, error = %e, "Connector: malformed request");
                let reply = error_reply(
                    &frame_id(&body),
                    codes::BAD_REQUEST,
                    format!("Malformed request: {e}"),
                );
                write_message(&mut writer, &reply).await?;
                continue;
            }
        };

        match msg.kind {
            WireMessageKind::Request(request) => {
                let response = handle_request(&msg.id, request, ctx).await;
                write_message(&mut writer, &response).await?;
            }
            WireMessageKind::Response(_) => {
                warn!(client = %client_id, id = %msg.id, "Connector: unexpected response message");
            }
        }
    }
}

/// Handle a single request after the handshake and produce a response.
async fn handle_request(id: &str, request: WireRequest, ctx: &ServeContext) -> WireMessage {
    let kind = match request {
        WireRequest::Invoke {
            object,
            operation,
            signature,
            args,
        } => match ctx
            .directory
            .invoke(&object, &operation, &signature, args)
            .await
        {
            Ok(value) => WireResponse::InvokeResult { value },
            Err(e) => {
                debug!(object = %object, operation = %operation, error = %e, "Connector: invocation failed");
                WireResponse::Error {
                    code: e.code(),
                    message: e.message().to_string(),
                }
            }
        },
        WireRequest::List => WireResponse::ObjectList {
            objects: list_objects(&ctx.directory),
        },
        WireRequest::Describe { object } => describe(&ctx.directory, &object),
        WireRequest::Ping => WireResponse::Pong {
            uptime_secs: ctx.started.elapsed().as_secs(),
        },
        WireRequest::Handshake { .. } => WireResponse::Error {
            code: codes::BAD_REQUEST,
            message: "Already handshaked".to_string(),
        },
    };

    WireMessage {
        id: id.to_string(),
        kind: WireMessageKind::Response(kind),
    }
}

fn list_objects(directory: &Directory) -> Vec<ObjectInfo> {
    directory
        .all()
        .into_iter()
        .map(|entry| ObjectInfo {
            interface: entry.object.interface().full_name(),
            name: entry.name,
        })
        .collect()
}

fn describe(directory: &Directory, object: &QualifiedName) -> WireResponse {
    match directory.lookup(object) {
        Ok(found) => WireResponse::Description {
            interface: found.interface().clone(),
        },
        Err(e) => WireResponse::Error {
            code: codes::NOT_FOUND,
            message: e.to_string(),
        },
    }
}

fn error_reply(id: &str, code: i32, message: String) -> WireMessage {
    WireMessage {
        id: id.to_string(),
        kind: WireMessageKind::Response(WireResponse::Error { code, message }),
    }
}

/// Write a framed message (4-byte length + JSON) to a TCP stream.
pub async fn write_message(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    msg: &WireMessage,
) -> Result<(), WireError> {
    let bytes = encode_message(msg)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a framed message (4-byte length + JSON) from a TCP stream.
pub async fn read_message(
    reader: &mut tokio::net::tcp::OwnedReadHalf,
) -> Result<WireMessage, WireError> {
    let body = read_frame(reader).await?;
    Ok(decode_message(&body)?)
}

/// Read one frame body without decoding it.
async fn read_frame(reader: &mut tokio::net::tcp::OwnedReadHalf) -> Result<Vec<u8>, WireError> {
    let mut header = [0u8; 4];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(WireError::ConnectionClosed);
        }
        Err(e) => return Err(WireError::Io(e)),
    }

    let len = decode_length(&header);
    if len > MAX_MESSAGE_SIZE {
        return Err(WireError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Best-effort `id` of a frame that failed to decode, so the error reply
/// can still be matched by the client.
fn frame_id(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use beacon_runtime::{into_managed, InvocationError};

    beacon_runtime::managed_interface! {
        pub trait Echo {
            fn echo(&self, text: String) -> String;
        }
    }

    struct Plain;

    #[async_trait]
    impl Echo for Plain {
        async fn echo(&self, text: String) -> Result<String, InvocationError> {
            Ok(text)
        }
    }

    fn populated() -> Arc<Directory> {
        let directory = Arc::new(Directory::new());
        directory
            .register(
                QualifiedName::new("test", "Echo").unwrap(),
                into_managed::<dyn Echo>(Arc::new(Plain)),
            )
            .unwrap();
        directory
    }

    fn ephemeral(path: &str) -> Endpoint {
        Endpoint::new(0, path)
    }

    async fn handshake(addr: SocketAddr, path: &str) -> WireMessage {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let msg = WireMessage {
            id: "hs-1".to_string(),
            kind: WireMessageKind::Request(WireRequest::Handshake {
                client_id: "test-client".to_string(),
                path: path.to_string(),
                protocol_version: PROTOCOL_VERSION,
            }),
        };
        write_message(&mut writer, &msg).await.unwrap();
        read_message(&mut reader).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_directory_binds_nothing() {
        let connector = Connector::new(Arc::new(Directory::new()));
        let outcome = connector.start(&ephemeral("jmxrmi")).await.unwrap();
        assert_eq!(outcome, StartOutcome::NothingPublished);
        assert_eq!(connector.state(), ConnectorState::Unstarted);
        assert!(connector.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_disabled_port_binds_nothing() {
        let connector = Connector::new(populated());
        let outcome = connector.start(&Endpoint::disabled()).await.unwrap();
        assert_eq!(outcome, StartOutcome::RemoteDisabled);
        assert_eq!(connector.state(), ConnectorState::Unstarted);
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let connector = Connector::new(populated());
        let addr = match connector.start(&ephemeral("jmxrmi")).await.unwrap() {
            StartOutcome::Listening(addr) => addr,
            other => panic!("Expected Listening, got {other:?}"),
        };
        assert_eq!(connector.state(), ConnectorState::Running);
        assert_eq!(connector.local_addr(), Some(addr));
        assert_eq!(connector.path().as_deref(), Some("jmxrmi"));

        match connector.start(&ephemeral("jmxrmi")).await {
            Err(ConnectorError::AlreadyRunning { address }) => assert_eq!(address, addr),
            other => panic!("Expected AlreadyRunning, got {other:?}"),
        }

        assert!(connector.stop().await);
        assert_eq!(connector.state(), ConnectorState::Stopped);
        assert!(!connector.stop().await);
        assert!(matches!(
            connector.start(&ephemeral("jmxrmi")).await,
            Err(ConnectorError::Stopped)
        ));

        // Port released
        TcpListener::bind(addr).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let connector = Connector::new(populated());
        assert!(!connector.stop().await);
        assert_eq!(connector.state(), ConnectorState::Unstarted);
    }

    #[tokio::test]
    async fn test_bind_failure_rolls_back() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let connector = Connector::new(populated());
        match connector.start(&Endpoint::new(port as i32, "jmxrmi")).await {
            Err(ConnectorError::EndpointBind { address, .. }) => {
                assert_eq!(address, format!("127.0.0.1:{port}"));
            }
            other => panic!("Expected EndpointBind, got {other:?}"),
        }
        assert_eq!(connector.state(), ConnectorState::Unstarted);

        drop(occupied);
        assert!(matches!(
            connector.start(&ephemeral("jmxrmi")).await,
            Ok(StartOutcome::Listening(_))
        ));
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_port_is_config_error() {
        let connector = Connector::new(populated());
        assert!(matches!(
            connector.start(&Endpoint::new(70000, "jmxrmi")).await,
            Err(ConnectorError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_start_yields_one_listener() {
        let connector = Arc::new(Connector::new(populated()));
        let mut tasks = Vec::new();
        for _ in 0..4 {
            let connector = Arc::clone(&connector);
            tasks.push(tokio::spawn(async move {
                connector.start(&Endpoint::new(0, "jmxrmi")).await
            }));
        }
        let mut listening = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(StartOutcome::Listening(_)) => listening += 1,
                Err(ConnectorError::AlreadyRunning { .. }) => {}
                other => panic!("Unexpected start result: {other:?}"),
            }
        }
        assert_eq!(listening, 1);
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_handshake_lists_objects() {
        let connector = Connector::new(populated());
        connector.start(&ephemeral("jmxrmi")).await.unwrap();
        let addr = connector.local_addr().unwrap();

        let ack = handshake(addr, "jmxrmi").await;
        assert_eq!(ack.id, "hs-1");
        match ack.kind {
            WireMessageKind::Response(WireResponse::HandshakeAck {
                server_id, objects, ..
            }) => {
                assert_eq!(server_id, connector.server_id());
                assert_eq!(objects.len(), 1);
                assert_eq!(objects[0].name.to_string(), "test:type=Echo");
                assert!(objects[0].interface.ends_with(".Echo"));
            }
            other => panic!("Expected HandshakeAck, got {other:?}"),
        }
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_wrong_path_rejected() {
        let connector = Connector::new(populated());
        connector.start(&ephemeral("jmxrmi")).await.unwrap();

        let reply = handshake(connector.local_addr().unwrap(), "other").await;
        match reply.kind {
            WireMessageKind::Response(WireResponse::Error { code, message }) => {
                assert_eq!(code, codes::NOT_FOUND);
                assert!(message.contains("other"));
            }
            other => panic!("Expected Error(404), got {other:?}"),
        }
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_request_before_handshake_rejected() {
        let connector = Connector::new(populated());
        connector.start(&ephemeral("jmxrmi")).await.unwrap();

        let stream = TcpStream::connect(connector.local_addr().unwrap())
            .await
            .unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let msg = WireMessage {
            id: "list-1".to_string(),
            kind: WireMessageKind::Request(WireRequest::List),
        };
        write_message(&mut writer, &msg).await.unwrap();

        let response = read_message(&mut reader).await.unwrap();
        assert_eq!(response.id, "list-1");
        match response.kind {
            WireMessageKind::Response(WireResponse::Error { code, message }) => {
                assert_eq!(code, codes::HANDSHAKE_REQUIRED);
                assert!(
                    message.contains("Handshake"),
                    "Expected handshake-required error, got: {message}"
                );
            }
            other => panic!("Expected Error(401), got {other:?}"),
        }
        connector.stop().await;
    }

    async fn write_raw(writer: &mut tokio::net::tcp::OwnedWriteHalf, body: &[u8]) {
        writer.write_all(&(body.len() as u32).to_be_bytes()).await.unwrap();
        writer.write_all(body).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_request_after_handshake_gets_bad_request() {
        let connector = Connector::new(populated());
        connector.start(&ephemeral("jmxrmi")).await.unwrap();

        let stream = TcpStream::connect(connector.local_addr().unwrap())
            .await
            .unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let hello = WireMessage {
            id: "hs-3".to_string(),
            kind: WireMessageKind::Request(WireRequest::Handshake {
                client_id: "sloppy-client".to_string(),
                path: "jmxrmi".to_string(),
                protocol_version: PROTOCOL_VERSION,
            }),
        };
        write_message(&mut writer, &hello).await.unwrap();
        read_message(&mut reader).await.unwrap();

        // Object name without the `type=` property.
        write_raw(
            &mut writer,
            br#"{"id":"d-1","type":"request","method":"describe","object":"bogus"}"#,
        )
        .await;
        let reply = read_message(&mut reader).await.unwrap();
        assert_eq!(reply.id, "d-1");
        match reply.kind {
            WireMessageKind::Response(WireResponse::Error { code, .. }) => {
                assert_eq!(code, codes::BAD_REQUEST);
            }
            other => panic!("Expected Error(400), got {other:?}"),
        }

        write_raw(&mut writer, b"not json").await;
        match read_message(&mut reader).await.unwrap().kind {
            WireMessageKind::Response(WireResponse::Error { code, .. }) => {
                assert_eq!(code, codes::BAD_REQUEST);
            }
            other => panic!("Expected Error(400), got {other:?}"),
        }

        // The connection is still usable.
        let ping = WireMessage {
            id: "p-1".to_string(),
            kind: WireMessageKind::Request(WireRequest::Ping),
        };
        write_message(&mut writer, &ping).await.unwrap();
        let pong = read_message(&mut reader).await.unwrap();
        assert_eq!(pong.id, "p-1");
        assert!(matches!(
            pong.kind,
            WireMessageKind::Response(WireResponse::Pong { .. })
        ));
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let connector = Connector::new(populated());
        connector.start(&ephemeral("jmxrmi")).await.unwrap();

        let stream = TcpStream::connect(connector.local_addr().unwrap())
            .await
            .unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let msg = WireMessage {
            id: "hs-2".to_string(),
            kind: WireMessageKind::Request(WireRequest::Handshake {
                client_id: "old-client".to_string(),
                path: "jmxrmi".to_string(),
                protocol_version: PROTOCOL_VERSION + 1,
            }),
        };
        write_message(&mut writer, &msg).await.unwrap();

        match read_message(&mut reader).await.unwrap().kind {
            WireMessageKind::Response(WireResponse::Error { code, .. }) => {
                assert_eq!(code, codes::VERSION_MISMATCH);
            }
            other => panic!("Expected Error(1), got {other:?}"),
        }
        connector.stop().await;
    }
}
