//! Bootstrap: resolve, publish and expose a module's registrations.
//!
//! [`Manager::manage`] runs the whole sequence once per module:
//!
//! 1. compute every registration's name and reject duplicates,
//! 2. resolve every implementation through the [`Resolver`],
//! 3. publish all of them in the directory, or none of them,
//! 4. start the connector on the module's server endpoint.
//!
//! Steps 1 and 2 touch nothing shared, so a configuration error leaves the
//! directory exactly as it was.

use crate::error::KernelResult;
use crate::module::BeaconModule;
use crate::resolver::Resolver;
use beacon_runtime::{Directory, ManagedObject};
use beacon_types::{BeaconError, QualifiedName};
use beacon_wire::{Connector, StartOutcome};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Result of a successful bootstrap.
pub struct Manager {
    directory: Arc<Directory>,
    connector: Arc<Connector>,
    published: Vec<QualifiedName>,
    outcome: Option<StartOutcome>,
}

impl Manager {
    /// Bootstrap `module` into the process-wide directory.
    pub async fn manage(module: &BeaconModule, resolver: &dyn Resolver) -> KernelResult<Manager> {
        Self::manage_in(Directory::platform(), module, resolver).await
    }

    /// Bootstrap `module` into `directory`.
    pub async fn manage_in(
        directory: Arc<Directory>,
        module: &BeaconModule,
        resolver: &dyn Resolver,
    ) -> KernelResult<Manager> {
        let connector = Arc::new(Connector::new(Arc::clone(&directory)));
        if module.registrations().is_empty() {
            info!("No managed objects registered, nothing to do");
            return Ok(Self {
                directory,
                connector,
                published: Vec::new(),
                outcome: None,
            });
        }

        let mut seen = HashSet::new();
        let mut planned = Vec::with_capacity(module.registrations().len());
        for registration in module.registrations() {
            let name = registration.name()?;
            if !seen.insert(name.clone()) {
                return Err(BeaconError::Conflict(name).into());
            }
            planned.push((name, registration));
        }
        module.server_endpoint().validate()?;

        let mut objects: Vec<(QualifiedName, Arc<dyn ManagedObject>)> = Vec::new();
        for (name, registration) in planned {
            let implementation = registration.implementation();
            let unresolved = || BeaconError::Unresolved {
                implementation: implementation.name().to_string(),
                name: name.clone(),
            };
            let instance = resolver.resolve(&implementation).ok_or_else(unresolved)?;
            let object = registration.binding().adapt(instance).ok_or_else(unresolved)?;
            objects.push((name, object));
        }

        let published = directory.register_all(objects)?;
        info!(count = published.len(), "Managed objects published");

        let outcome = connector.start(module.server_endpoint()).await?;
        if let StartOutcome::Listening(addr) = &outcome {
            info!(
                address = %addr,
                path = %module.server_endpoint().path,
                "Remote access enabled"
            );
        }

        Ok(Self {
            directory,
            connector,
            published,
            outcome: Some(outcome),
        })
    }

    /// The directory objects were published in.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    pub fn connector(&self) -> &Arc<Connector> {
        &self.connector
    }

    /// Names published by this bootstrap, in registration order.
    pub fn published(&self) -> &[QualifiedName] {
        &self.published
    }

    /// What the connector did; `None` when the module registered nothing.
    pub fn outcome(&self) -> Option<&StartOutcome> {
        self.outcome.as_ref()
    }

    /// Connector address while remote access is running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.connector.local_addr()
    }

    /// Stop remote access. Published objects stay in the directory.
    pub async fn shutdown(&self) -> bool {
        self.connector.stop().await
    }
}
