//! Typed access to a remote directory.

use crate::error::{KernelError, KernelResult};
use beacon_runtime::{create_proxy, ManagedInterface, ProxyHandle};
use beacon_types::{Endpoint, InterfaceDescriptor, QualifiedName};
use beacon_wire::RemoteChannel;
use std::sync::Arc;

/// Builds proxies that share one connection to a remote directory.
#[derive(Clone)]
pub struct BeaconClient {
    channel: Arc<RemoteChannel>,
}

impl BeaconClient {
    /// A client for the directory at `endpoint`. Nothing is dialed until
    /// the first call.
    pub fn new(endpoint: Endpoint) -> KernelResult<Self> {
        if !endpoint.is_enabled() {
            return Err(KernelError::RemoteClientDisabled);
        }
        endpoint.validate()?;
        Ok(Self {
            channel: Arc::new(RemoteChannel::new(endpoint)),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.channel.endpoint()
    }

    /// The shared channel, for listing and describing remote objects.
    pub fn channel(&self) -> &Arc<RemoteChannel> {
        &self.channel
    }

    /// Proxy for the object published under `I`'s default name
    /// (`<namespace>:type=<Name>`).
    pub fn proxy<I: ?Sized + ManagedInterface>(&self) -> KernelResult<Arc<I>> {
        let name = I::descriptor().default_name()?;
        Ok(self.proxy_named::<I>(name))
    }

    /// Proxy for the object published under `name`.
    pub fn proxy_named<I: ?Sized + ManagedInterface>(&self, name: QualifiedName) -> Arc<I> {
        create_proxy::<I>(name, self.channel.clone())
    }

    /// Untyped handle for an interface known only at runtime, e.g. one
    /// fetched with [`RemoteChannel::describe`].
    pub fn handle(&self, interface: InterfaceDescriptor, name: QualifiedName) -> ProxyHandle {
        ProxyHandle::new(interface, name, self.channel.clone())
    }
}

impl std::fmt::Debug for BeaconClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeaconClient")
            .field("endpoint", self.endpoint())
            .field("client_id", &self.channel.client_id())
            .finish()
    }
}
