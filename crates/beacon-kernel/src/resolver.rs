//! Instance resolution for registered implementation types.
//!
//! Bootstrap never constructs implementation objects itself; it asks a
//! [`Resolver`] for the instance bound to each registered type. [`Bindings`]
//! is the ready-made resolver: a concurrent map from type to one shared
//! instance.

use beacon_types::TypeDescriptor;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::debug;

/// Type-erased instance handed to the directory.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Provides the instance to publish for an implementation type.
pub trait Resolver: Send + Sync {
    /// The instance bound to `implementation`, or `None` if nothing is bound.
    fn resolve(&self, implementation: &TypeDescriptor) -> Option<Instance>;
}

/// Resolver backed by explicitly bound singletons.
///
/// Every type resolves to the same instance each time, so a type registered
/// under several interfaces is published as one object.
#[derive(Default)]
pub struct Bindings {
    instances: DashMap<TypeId, Instance>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `instance` as the singleton for `T`, replacing any earlier one.
    pub fn bind<T: Any + Send + Sync>(&self, instance: T) -> &Self {
        self.bind_arc(Arc::new(instance))
    }

    /// Bind an already shared instance, so the caller can keep a handle.
    pub fn bind_arc<T: Any + Send + Sync>(&self, instance: Arc<T>) -> &Self {
        debug!(implementation = std::any::type_name::<T>(), "Bound instance");
        self.instances.insert(TypeId::of::<T>(), instance);
        self
    }

    /// Whether an instance is bound for `T`.
    pub fn contains<T: Any>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Resolver for Bindings {
    fn resolve(&self, implementation: &TypeDescriptor) -> Option<Instance> {
        self.instances
            .get(&implementation.id())
            .map(|entry| Arc::clone(entry.value()))
    }
}
