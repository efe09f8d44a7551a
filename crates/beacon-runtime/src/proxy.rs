//! Proxy factory: local stand-ins for remote managed objects.
//!
//! A [`ProxyHandle`] pairs a qualified name with an interface's method table
//! and an [`InvocationChannel`]. The table is built once, when the handle is
//! created; each call only looks up the parameter signature and forwards.
//! The handle does no caching, retrying or timing out of its own: those are
//! the channel's concerns.

use crate::managed::ManagedInterface;
use async_trait::async_trait;
use beacon_types::{codes, InterfaceDescriptor, InvocationError, QualifiedName};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Transport capability that carries one call to a named object and brings
/// back its result.
#[async_trait]
pub trait InvocationChannel: Send + Sync {
    async fn invoke(
        &self,
        name: &QualifiedName,
        method: &str,
        signature: &[String],
        args: Vec<Value>,
    ) -> Result<Value, InvocationError>;
}

/// Untyped proxy: forwards calls by method name.
///
/// Cheap to clone and safe to share between tasks; it holds no per-call
/// state.
#[derive(Clone)]
pub struct ProxyHandle {
    name: QualifiedName,
    interface: Arc<InterfaceDescriptor>,
    signatures: Arc<HashMap<String, Vec<String>>>,
    channel: Arc<dyn InvocationChannel>,
}

impl ProxyHandle {
    /// Build a handle for `name`, implementing `interface`, calling through
    /// `channel`.
    pub fn new(
        interface: InterfaceDescriptor,
        name: QualifiedName,
        channel: Arc<dyn InvocationChannel>,
    ) -> Self {
        let signatures = interface
            .methods
            .iter()
            .map(|m| (m.name.clone(), m.param_types()))
            .collect();
        Self {
            name,
            interface: Arc::new(interface),
            signatures: Arc::new(signatures),
            channel,
        }
    }

    /// The remote object's name.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// The interface this handle speaks.
    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.interface
    }

    /// Forward `method(args)` to the remote object.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, InvocationError> {
        let signature = self
            .signatures
            .get(method)
            .ok_or_else(|| InvocationError::unknown_method(method))?;
        if signature.len() != args.len() {
            return Err(InvocationError::rejected(
                codes::BAD_REQUEST,
                format!(
                    "{}.{method} expects {} argument(s), got {}",
                    self.interface.full_name(),
                    signature.len(),
                    args.len()
                ),
            ));
        }
        self.channel
            .invoke(&self.name, method, signature, args)
            .await
    }
}

impl std::fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyHandle")
            .field("name", &self.name.to_string())
            .field("interface", &self.interface.full_name())
            .finish()
    }
}

/// Typed proxy. `managed_interface!` implements each interface trait `I` for
/// `Proxy<dyn I>`.
pub struct Proxy<I: ?Sized> {
    handle: ProxyHandle,
    _interface: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized> Proxy<I> {
    pub fn new(handle: ProxyHandle) -> Self {
        Self {
            handle,
            _interface: PhantomData,
        }
    }

    /// The untyped handle behind this proxy.
    pub fn handle(&self) -> &ProxyHandle {
        &self.handle
    }
}

/// Create a typed proxy for the object published under `name`.
pub fn create_proxy<I: ?Sized + ManagedInterface>(
    name: QualifiedName,
    channel: Arc<dyn InvocationChannel>,
) -> Arc<I> {
    let handle = ProxyHandle::new(I::descriptor().clone(), name, channel);
    I::proxy(handle)
}
