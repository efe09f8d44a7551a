//! Managed object contracts.
//!
//! Three traits meet here:
//!
//! - [`ManagedObject`] is what the directory stores: an object that can be
//!   called by method name with JSON arguments.
//! - [`ManagedInterface`] is implemented for `dyn Trait` by
//!   [`managed_interface!`](crate::managed_interface) and knows how to
//!   describe, dispatch and proxy that trait.
//! - [`Manageable`] is the capability marker an implementation type carries
//!   to name the contracts it exposes; [`manageable!`](crate::manageable)
//!   writes it.

use async_trait::async_trait;
use beacon_types::{codes, InterfaceDescriptor, InvocationError, TypeDescriptor};
use futures::future::BoxFuture;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use crate::proxy::ProxyHandle;

/// An object that can be invoked by method name.
///
/// Neither the directory nor the connector serializes calls: several callers
/// may invoke the same object at once, and the implementation must be safe
/// under that.
#[async_trait]
pub trait ManagedObject: Send + Sync + 'static {
    /// The contract this object is published with.
    fn interface(&self) -> &InterfaceDescriptor;

    /// Call `method` with `args`. `signature` lists the parameter types the
    /// caller believes the method has; a mismatch is rejected.
    async fn invoke(
        &self,
        method: &str,
        signature: &[String],
        args: Vec<Value>,
    ) -> Result<Value, InvocationError>;
}

/// Compile-time description of a manageable trait, implemented for
/// `dyn Trait`.
pub trait ManagedInterface: Send + Sync + 'static {
    /// The interface descriptor, built once per process.
    fn descriptor() -> &'static InterfaceDescriptor;

    /// Decode `args`, call `method` on `target` and encode the result.
    fn dispatch<'a>(
        target: &'a Self,
        method: &'a str,
        args: Vec<Value>,
    ) -> BoxFuture<'a, Result<Value, InvocationError>>;

    /// Wrap a proxy handle into a value implementing the trait.
    fn proxy(handle: ProxyHandle) -> Arc<Self>;
}

/// Upcast from an implementation type to one of its manageable interfaces.
pub trait Implements<I: ?Sized + ManagedInterface>: Any + Send + Sync {
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

/// Capability marker: the manageable interfaces a type declares.
///
/// Registration without an explicit interface requires exactly one entry.
pub trait Manageable: Any + Send + Sync {
    fn manageable_interfaces() -> Vec<InterfaceBinding>
    where
        Self: Sized;
}

type Adapter = fn(Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn ManagedObject>>;

/// Pairing of an interface with the function that turns a resolved instance
/// into a managed object for that interface.
#[derive(Clone, Copy)]
pub struct InterfaceBinding {
    descriptor: &'static InterfaceDescriptor,
    implementation: TypeDescriptor,
    adapt: Adapter,
}

impl InterfaceBinding {
    /// The bound interface.
    pub fn descriptor(&self) -> &'static InterfaceDescriptor {
        self.descriptor
    }

    /// The implementation type the binding expects to receive.
    pub fn implementation(&self) -> TypeDescriptor {
        self.implementation
    }

    /// Convert a resolved instance. Returns `None` if the instance is not of
    /// the bound implementation type.
    pub fn adapt(&self, instance: Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn ManagedObject>> {
        (self.adapt)(instance)
    }
}

impl std::fmt::Debug for InterfaceBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceBinding")
            .field("interface", &self.descriptor.full_name())
            .field("implementation", &self.implementation.name())
            .finish()
    }
}

/// Bind implementation `T` to interface `I`.
pub fn bind<I, T>() -> InterfaceBinding
where
    I: ?Sized + ManagedInterface,
    T: Implements<I>,
{
    InterfaceBinding {
        descriptor: I::descriptor(),
        implementation: TypeDescriptor::of::<T>(),
        adapt: adapt::<I, T>,
    }
}

fn adapt<I, T>(instance: Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn ManagedObject>>
where
    I: ?Sized + ManagedInterface,
    T: Implements<I>,
{
    let typed = instance.downcast::<T>().ok()?;
    Some(into_managed::<I>(<T as Implements<I>>::upcast(typed)))
}

/// Publish an interface reference as a managed object.
pub fn into_managed<I: ?Sized + ManagedInterface>(target: Arc<I>) -> Arc<dyn ManagedObject> {
    Arc::new(Dispatcher::new(target))
}

/// Server-side adapter from [`ManagedObject`] to a typed interface.
///
/// Method and signature checks happen here, against the interface
/// descriptor, before the generated dispatch decodes any argument.
pub struct Dispatcher<I: ?Sized + ManagedInterface> {
    target: Arc<I>,
}

impl<I: ?Sized + ManagedInterface> Dispatcher<I> {
    pub fn new(target: Arc<I>) -> Self {
        Self { target }
    }

    /// The wrapped interface reference.
    pub fn target(&self) -> &Arc<I> {
        &self.target
    }
}

#[async_trait]
impl<I: ?Sized + ManagedInterface> ManagedObject for Dispatcher<I> {
    fn interface(&self) -> &InterfaceDescriptor {
        I::descriptor()
    }

    async fn invoke(
        &self,
        method: &str,
        signature: &[String],
        args: Vec<Value>,
    ) -> Result<Value, InvocationError> {
        let descriptor = I::descriptor();
        let declared = descriptor
            .method(method)
            .ok_or_else(|| InvocationError::unknown_method(method))?;

        if !declared.accepts(signature) {
            return Err(InvocationError::rejected(
                codes::UNKNOWN_METHOD,
                format!(
                    "No method {}.{}({}); declared as {}",
                    descriptor.full_name(),
                    method,
                    signature.join(", "),
                    declared
                ),
            ));
        }
        if args.len() != declared.params.len() {
            return Err(InvocationError::rejected(
                codes::BAD_REQUEST,
                format!(
                    "{} expects {} argument(s), got {}",
                    declared,
                    declared.params.len(),
                    args.len()
                ),
            ));
        }

        I::dispatch(self.target.as_ref(), method, args).await
    }
}
