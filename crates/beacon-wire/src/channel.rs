//! Remote invocation channel: the client side of the connector protocol.
//!
//! A [`RemoteChannel`] connects lazily on the first call, performs the
//! handshake, and then reuses the connection for every following request.
//! Requests on one channel are sent one at a time. Any transport failure
//! drops the connection; the next call dials again. There is no retry or
//! timeout of its own.

use crate::connector::{read_message, write_message, WireError};
use crate::message::*;

use async_trait::async_trait;
use beacon_runtime::InvocationChannel;
use beacon_types::{codes, Endpoint, InterfaceDescriptor, InvocationError, QualifiedName};
use serde_json::Value;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info};

struct Connection {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    server_id: String,
}

/// Invocation channel that reaches a directory through its connector.
pub struct RemoteChannel {
    endpoint: Endpoint,
    client_id: String,
    connection: Mutex<Option<Connection>>,
}

impl RemoteChannel {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            client_id: uuid::Uuid::new_v4().to_string(),
            connection: Mutex::new(None),
        }
    }

    /// Where this channel connects to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// This client's unique ID, sent in the handshake.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// ID of the server currently connected to, if any.
    pub async fn server_id(&self) -> Option<String> {
        self.connection
            .lock()
            .await
            .as_ref()
            .map(|c| c.server_id.clone())
    }

    /// Drop the current connection, if any.
    pub async fn disconnect(&self) {
        if self.connection.lock().await.take().is_some() {
            debug!(endpoint = %self.endpoint, "Remote channel disconnected");
        }
    }

    /// Every object published by the remote directory.
    pub async fn list(&self) -> Result<Vec<ObjectInfo>, InvocationError> {
        match self.request(WireRequest::List).await? {
            WireResponse::ObjectList { objects } => Ok(objects),
            other => Err(unexpected("list", &other)),
        }
    }

    /// Interface of the object published under `name`.
    pub async fn describe(&self, name: &QualifiedName) -> Result<InterfaceDescriptor, InvocationError> {
        let request = WireRequest::Describe {
            object: name.clone(),
        };
        match self.request(request).await? {
            WireResponse::Description { interface } => Ok(interface),
            other => Err(unexpected("describe", &other)),
        }
    }

    /// Connector uptime in seconds.
    pub async fn ping(&self) -> Result<u64, InvocationError> {
        match self.request(WireRequest::Ping).await? {
            WireResponse::Pong { uptime_secs } => Ok(uptime_secs),
            other => Err(unexpected("ping", &other)),
        }
    }

    /// Send one request and wait for its response, connecting first if
    /// needed. Error responses are converted to `InvocationError`s.
    async fn request(&self, request: WireRequest) -> Result<WireResponse, InvocationError> {
        let mut guard = self.connection.lock().await;
        // Owned by this future until the reply is read: a cancelled call
        // drops the connection instead of leaving its reply unread.
        let mut connection = match guard.take() {
            Some(connection) => connection,
            None => self.connect().await?,
        };

        match exchange(&mut connection, request).await {
            Ok(response) => {
                *guard = Some(connection);
                match response {
                    WireResponse::Error { code, message } => Err(remote_failure(code, message)),
                    response => Ok(response),
                }
            }
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "Remote channel: dropping connection");
                Err(wire_failure(&self.endpoint, e))
            }
        }
    }

    async fn connect(&self) -> Result<Connection, InvocationError> {
        let port = self
            .endpoint
            .port_number()
            .map_err(|e| InvocationError::rejected(codes::BAD_REQUEST, e.to_string()))?
            .ok_or_else(|| {
                InvocationError::Unreachable("remote client endpoint is disabled".to_string())
            })?;

        let stream = TcpStream::connect((self.endpoint.host.as_str(), port))
            .await
            .map_err(|e| InvocationError::Unreachable(format!("{}: {e}", self.endpoint)))?;
        let (reader, writer) = stream.into_split();
        let mut connection = Connection {
            reader,
            writer,
            server_id: String::new(),
        };

        let handshake = WireRequest::Handshake {
            client_id: self.client_id.clone(),
            path: self.endpoint.path.clone(),
            protocol_version: PROTOCOL_VERSION,
        };
        match exchange(&mut connection, handshake).await {
            Ok(WireResponse::HandshakeAck {
                server_id,
                protocol_version,
                objects,
            }) => {
                if protocol_version != PROTOCOL_VERSION {
                    return Err(wire_failure(
                        &self.endpoint,
                        WireError::VersionMismatch {
                            local: PROTOCOL_VERSION,
                            remote: protocol_version,
                        },
                    ));
                }
                info!(
                    endpoint = %self.endpoint,
                    server = %server_id,
                    objects = objects.len(),
                    "Remote channel connected"
                );
                connection.server_id = server_id;
                Ok(connection)
            }
            Ok(WireResponse::Error { code, message }) => Err(remote_failure(code, message)),
            Ok(other) => Err(unexpected("handshake", &other)),
            Err(e) => Err(wire_failure(&self.endpoint, e)),
        }
    }
}

#[async_trait]
impl InvocationChannel for RemoteChannel {
    async fn invoke(
        &self,
        name: &QualifiedName,
        method: &str,
        signature: &[String],
        args: Vec<Value>,
    ) -> Result<Value, InvocationError> {
        let request = WireRequest::Invoke {
            object: name.clone(),
            operation: method.to_string(),
            signature: signature.to_vec(),
            args,
        };
        match self.request(request).await? {
            WireResponse::InvokeResult { value } => Ok(value),
            other => Err(unexpected(method, &other)),
        }
    }
}

/// Write `request` with a fresh ID and read the matching response.
async fn exchange(connection: &mut Connection, request: WireRequest) -> Result<WireResponse, WireError> {
    let id = uuid::Uuid::new_v4().to_string();
    let msg = WireMessage {
        id: id.clone(),
        kind: WireMessageKind::Request(request),
    };
    write_message(&mut connection.writer, &msg).await?;

    let reply = read_message(&mut connection.reader).await?;
    if reply.id != id {
        return Err(WireError::UnexpectedResponse(format!(
            "expected reply to {id}, got {}",
            reply.id
        )));
    }
    match reply.kind {
        WireMessageKind::Response(response) => Ok(response),
        WireMessageKind::Request(_) => Err(WireError::UnexpectedResponse(
            "server sent a request".to_string(),
        )),
    }
}

fn remote_failure(code: i32, message: String) -> InvocationError {
    if code == codes::APPLICATION {
        InvocationError::Application(message)
    } else {
        InvocationError::Rejected { code, message }
    }
}

fn wire_failure(endpoint: &Endpoint, err: WireError) -> InvocationError {
    match err {
        WireError::Io(_) | WireError::ConnectionClosed => {
            InvocationError::Unreachable(format!("{endpoint}: {err}"))
        }
        WireError::VersionMismatch { .. } => {
            InvocationError::rejected(codes::VERSION_MISMATCH, err.to_string())
        }
        WireError::HandshakeFailed(_) => InvocationError::rejected(codes::BAD_REQUEST, err.to_string()),
        WireError::Json(_) | WireError::MessageTooLarge { .. } | WireError::UnexpectedResponse(_) => {
            InvocationError::Marshal(err.to_string())
        }
    }
}

fn unexpected(request: &str, response: &WireResponse) -> InvocationError {
    InvocationError::Marshal(format!("unexpected response to {request}: {response:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{Connector, StartOutcome};
    use beacon_runtime::{create_proxy, into_managed, Directory};
    use std::sync::Arc;

    beacon_runtime::managed_interface! {
        pub trait Hello {
            fn say_hello(&self, name: String) -> String;
            fn refuse(&self) -> ();
            fn pause(&self, millis: u64) -> u64;
        }
    }

    struct HelloImpl;

    #[async_trait]
    impl Hello for HelloImpl {
        async fn say_hello(&self, name: String) -> Result<String, InvocationError> {
            Ok(format!("Hello {name}"))
        }

        async fn refuse(&self) -> Result<(), InvocationError> {
            Err(InvocationError::application("not today"))
        }

        async fn pause(&self, millis: u64) -> Result<u64, InvocationError> {
            tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
            Ok(millis)
        }
    }

    fn hello_name() -> QualifiedName {
        QualifiedName::new("demo", "Hello").unwrap()
    }

    async fn serve() -> (Connector, Endpoint) {
        let directory = Arc::new(Directory::new());
        directory
            .register(hello_name(), into_managed::<dyn Hello>(Arc::new(HelloImpl)))
            .unwrap();
        let connector = Connector::new(directory);
        let addr = match connector.start(&Endpoint::new(0, "jmxrmi")).await.unwrap() {
            StartOutcome::Listening(addr) => addr,
            other => panic!("Expected Listening, got {other:?}"),
        };
        (connector, Endpoint::new(addr.port() as i32, "jmxrmi"))
    }

    #[tokio::test]
    async fn test_remote_proxy_call() {
        let (connector, endpoint) = serve().await;
        let channel = Arc::new(RemoteChannel::new(endpoint));
        let hello = create_proxy::<dyn Hello>(hello_name(), channel.clone());

        assert_eq!(hello.say_hello("World".to_string()).await.unwrap(), "Hello World");
        assert_eq!(
            channel.server_id().await.as_deref(),
            Some(connector.server_id())
        );

        let err = hello.refuse().await.unwrap_err();
        assert_eq!(err, InvocationError::application("not today"));
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_list_describe_ping() {
        let (connector, endpoint) = serve().await;
        let channel = RemoteChannel::new(endpoint);

        let objects = channel.list().await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, hello_name());

        let interface = channel.describe(&hello_name()).await.unwrap();
        assert_eq!(interface.name, "Hello");
        assert!(interface.method("say_hello").is_some());

        let missing = QualifiedName::new("demo", "Missing").unwrap();
        let err = channel.describe(&missing).await.unwrap_err();
        assert_eq!(err.code(), codes::NOT_FOUND);

        channel.ping().await.unwrap();
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_unreachable_when_nothing_listens() {
        let (connector, endpoint) = serve().await;
        connector.stop().await;

        let channel = RemoteChannel::new(endpoint);
        let err = channel.ping().await.unwrap_err();
        assert!(err.is_transient(), "Expected Unreachable, got {err:?}");
    }

    #[tokio::test]
    async fn test_wrong_path_is_rejected() {
        let (connector, endpoint) = serve().await;
        let mut wrong = endpoint.clone();
        wrong.path = "elsewhere".to_string();

        let channel = RemoteChannel::new(wrong);
        let err = channel.list().await.unwrap_err();
        assert_eq!(err.code(), codes::NOT_FOUND);
        assert!(!err.is_transient());
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_connection_dropped_after_server_stop() {
        let (connector, endpoint) = serve().await;
        let channel = RemoteChannel::new(endpoint);
        channel.ping().await.unwrap();

        connector.stop().await;
        let err = channel.ping().await.unwrap_err();
        assert!(err.is_transient(), "Expected Unreachable, got {err:?}");
        assert!(channel.server_id().await.is_none());
    }

    #[tokio::test]
    async fn test_call_after_caller_timeout_succeeds() {
        let (connector, endpoint) = serve().await;
        let channel = Arc::new(RemoteChannel::new(endpoint));
        let hello = create_proxy::<dyn Hello>(hello_name(), channel.clone());
        assert_eq!(hello.say_hello("a".to_string()).await.unwrap(), "Hello a");

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), hello.pause(200)).await;
        assert!(timed_out.is_err());
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;

        assert_eq!(hello.say_hello("b".to_string()).await.unwrap(), "Hello b");
        assert_eq!(hello.pause(1).await.unwrap(), 1);
        connector.stop().await;
    }

    #[tokio::test]
    async fn test_disabled_endpoint_is_unreachable() {
        let channel = RemoteChannel::new(Endpoint::disabled());
        let err = channel.list().await.unwrap_err();
        assert!(err.is_transient());
    }
}
