//! Managed object directory: maps qualified names to live objects.
//!
//! The [`Directory`] is a thread-safe registry shared by the bootstrap code,
//! the connector's connection tasks and any number of local callers. Writers
//! hold an exclusive lock, so a reader never observes a partially inserted
//! entry.

use crate::managed::ManagedObject;
use crate::proxy::InvocationChannel;
use async_trait::async_trait;
use beacon_types::{BeaconError, InvocationError, QualifiedName};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, info};

/// One published object.
#[derive(Clone)]
pub struct DirectoryEntry {
    /// The name the object is published under.
    pub name: QualifiedName,
    /// The object itself.
    pub object: Arc<dyn ManagedObject>,
}

impl std::fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryEntry")
            .field("name", &self.name.to_string())
            .field("interface", &self.object.interface().full_name())
            .finish()
    }
}

/// Thread-safe registry of managed objects.
#[derive(Default)]
pub struct Directory {
    entries: RwLock<BTreeMap<QualifiedName, Arc<dyn ManagedObject>>>,
}

static PLATFORM: OnceLock<Arc<Directory>> = OnceLock::new();

impl Directory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide directory, created on first use. Concurrent first
    /// calls all receive the same instance.
    pub fn platform() -> Arc<Directory> {
        PLATFORM
            .get_or_init(|| {
                info!("Creating platform directory");
                Arc::new(Directory::new())
            })
            .clone()
    }

    /// Publish `object` under `name`. Fails with `Conflict` if the name is
    /// taken; the existing entry is kept.
    pub fn register(
        &self,
        name: QualifiedName,
        object: Arc<dyn ManagedObject>,
    ) -> Result<(), BeaconError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&name) {
            return Err(BeaconError::Conflict(name));
        }
        debug!(
            name = %name,
            interface = %object.interface().full_name(),
            "Registered managed object"
        );
        entries.insert(name, object);
        Ok(())
    }

    /// Publish every object in `objects` or none of them. Names are checked
    /// against the directory and against each other before anything is
    /// inserted, under a single write lock, so no reader ever sees part of
    /// the batch.
    pub fn register_all(
        &self,
        objects: Vec<(QualifiedName, Arc<dyn ManagedObject>)>,
    ) -> Result<Vec<QualifiedName>, BeaconError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let mut names = BTreeSet::new();
        for (name, _) in &objects {
            if entries.contains_key(name) || !names.insert(name) {
                return Err(BeaconError::Conflict(name.clone()));
            }
        }

        let mut published = Vec::with_capacity(objects.len());
        for (name, object) in objects {
            debug!(
                name = %name,
                interface = %object.interface().full_name(),
                "Registered managed object"
            );
            entries.insert(name.clone(), object);
            published.push(name);
        }
        Ok(published)
    }

    /// Remove a published object.
    pub fn unregister(&self, name: &QualifiedName) -> Result<Arc<dyn ManagedObject>, BeaconError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries
            .remove(name)
            .ok_or_else(|| BeaconError::NotFound(name.clone()))?;
        debug!(name = %name, "Unregistered managed object");
        Ok(removed)
    }

    /// Find the object published under `name`.
    pub fn lookup(&self, name: &QualifiedName) -> Result<Arc<dyn ManagedObject>, BeaconError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| BeaconError::NotFound(name.clone()))
    }

    /// Whether `name` is published.
    pub fn contains(&self, name: &QualifiedName) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(name)
    }

    /// Snapshot of every entry, ordered by name. Iterate it as often as
    /// needed; call again to observe later registrations.
    pub fn all(&self) -> Vec<DirectoryEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .map(|(name, object)| DirectoryEntry {
                name: name.clone(),
                object: Arc::clone(object),
            })
            .collect()
    }

    /// Published names, ordered.
    pub fn names(&self) -> Vec<QualifiedName> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }

    /// Number of published objects.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Calls made straight into the directory, without a network hop. The
/// connector serves remote `invoke` requests through this same path.
#[async_trait]
impl InvocationChannel for Directory {
    async fn invoke(
        &self,
        name: &QualifiedName,
        method: &str,
        signature: &[String],
        args: Vec<Value>,
    ) -> Result<Value, InvocationError> {
        let object = self
            .lookup(name)
            .map_err(|_| InvocationError::not_found(name))?;
        object.invoke(method, signature, args).await
    }
}
