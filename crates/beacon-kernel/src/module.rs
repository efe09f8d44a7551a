//! Registration and endpoint configuration.
//!
//! A [`BeaconModule`] collects what an application wants published: one
//! [`Registration`] per implementation type, plus the server and client
//! endpoints. Nothing is resolved or started here; see
//! [`Manager`](crate::Manager).

use crate::client::BeaconClient;
use crate::error::KernelResult;
use beacon_runtime::{bind, Implements, InterfaceBinding, Manageable, ManagedInterface};
use beacon_types::{
    BeaconConfig, BeaconError, Endpoint, InterfaceDescriptor, QualifiedName, TypeDescriptor,
};
use tracing::debug;

/// One implementation type to publish, with the interface it is published
/// as and the name it is published under.
///
/// Domain and type default to the interface's namespace and simple name.
/// They can only be changed through the [`RegistrationBuilder`] returned
/// when the registration is made.
#[derive(Debug, Clone)]
pub struct Registration {
    binding: InterfaceBinding,
    domain: String,
    kind: String,
}

impl Registration {
    fn new(binding: InterfaceBinding) -> Self {
        let descriptor = binding.descriptor();
        Self {
            domain: descriptor.namespace.clone(),
            kind: descriptor.name.clone(),
            binding,
        }
    }

    /// The interface the object is published as.
    pub fn interface(&self) -> &'static InterfaceDescriptor {
        self.binding.descriptor()
    }

    /// The implementation type to resolve.
    pub fn implementation(&self) -> TypeDescriptor {
        self.binding.implementation()
    }

    pub fn binding(&self) -> InterfaceBinding {
        self.binding
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The `type` key of the published name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The qualified name this registration publishes under.
    pub fn name(&self) -> Result<QualifiedName, BeaconError> {
        QualifiedName::new(self.domain.clone(), self.kind.clone())
    }
}

/// Overrides the naming defaults of a registration just made.
pub struct RegistrationBuilder<'a> {
    registration: &'a mut Registration,
}

impl RegistrationBuilder<'_> {
    /// Publish under `domain` instead of the interface namespace.
    pub fn to_domain(self, domain: impl Into<String>) -> Self {
        self.registration.domain = domain.into();
        self
    }

    /// Publish with `type=<kind>` instead of the interface name.
    pub fn as_type(self, kind: impl Into<String>) -> Self {
        self.registration.kind = kind.into();
        self
    }
}

/// Declarative description of what to publish and where.
///
/// ```rust,ignore
/// let mut module = BeaconModule::new().with_remote_server(9999, "jmxrmi");
/// module.register::<HelloImpl>()?.to_domain("demo").as_type("Hello");
/// module.register_as::<dyn Counter, CounterImpl>();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BeaconModule {
    registrations: Vec<Registration>,
    config: BeaconConfig,
}

impl BeaconModule {
    /// A module with no registrations and both endpoints disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A module with endpoints taken from a loaded configuration.
    pub fn from_config(config: BeaconConfig) -> Self {
        Self {
            registrations: Vec::new(),
            config,
        }
    }

    /// Register `T` under the single manageable interface it declares.
    ///
    /// Fails with `NoInterfaceFound` if `T` declares none and with
    /// `AmbiguousInterface` if it declares more than one; use
    /// [`register_as`](Self::register_as) for those types.
    pub fn register<T: Manageable>(&mut self) -> Result<RegistrationBuilder<'_>, BeaconError> {
        let implementation = TypeDescriptor::of::<T>();
        let mut declared = T::manageable_interfaces();
        let binding = match declared.len() {
            0 => {
                return Err(BeaconError::NoInterfaceFound {
                    implementation: implementation.name().to_string(),
                });
            }
            1 => declared.remove(0),
            _ => {
                return Err(BeaconError::AmbiguousInterface {
                    implementation: implementation.name().to_string(),
                    candidates: declared
                        .iter()
                        .map(|b| b.descriptor().full_name())
                        .collect(),
                });
            }
        };
        Ok(self.push(binding))
    }

    /// Register `T` as interface `I` explicitly.
    pub fn register_as<I, T>(&mut self) -> RegistrationBuilder<'_>
    where
        I: ?Sized + ManagedInterface,
        T: Implements<I>,
    {
        self.push(bind::<I, T>())
    }

    fn push(&mut self, binding: InterfaceBinding) -> RegistrationBuilder<'_> {
        debug!(
            interface = %binding.descriptor().full_name(),
            implementation = %binding.implementation(),
            "Registration added"
        );
        self.registrations.push(Registration::new(binding));
        let index = self.registrations.len() - 1;
        RegistrationBuilder {
            registration: &mut self.registrations[index],
        }
    }

    /// Expose the directory on `port` under `path`. `-1` disables.
    pub fn with_remote_server(mut self, port: i32, path: impl Into<String>) -> Self {
        self.config.server.port = port;
        self.config.server.path = path.into();
        self
    }

    /// Point proxies at the directory on `port` under `path`. `-1` disables.
    pub fn with_remote_client(mut self, port: i32, path: impl Into<String>) -> Self {
        self.config.client.port = port;
        self.config.client.path = path.into();
        self
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    /// Where the connector listens.
    pub fn server_endpoint(&self) -> &Endpoint {
        &self.config.server
    }

    /// Where proxies connect to.
    pub fn client_endpoint(&self) -> &Endpoint {
        &self.config.client
    }

    /// A client for the configured remote directory.
    pub fn client(&self) -> KernelResult<BeaconClient> {
        BeaconClient::new(self.config.client.clone())
    }
}
