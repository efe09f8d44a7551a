//! Integration tests for the directory and proxy factory working together.
//!
//! Objects are registered the way bootstrap code registers them (through an
//! `InterfaceBinding` and a type-erased instance) and called back through
//! typed proxies that use the directory itself as the invocation channel.
//! Nothing leaves the process.

use async_trait::async_trait;
use beacon_runtime::{
    create_proxy, Directory, InvocationChannel, InvocationError, Manageable, ManagedInterface,
    QualifiedName,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub label: String,
    pub hits: u64,
}

beacon_runtime::managed_interface! {
    /// A labelled hit counter.
    pub trait Gauge {
        fn hit(&self) -> u64;
        fn rename(&self, label: String) -> ();
        fn snapshot(&self) -> Snapshot;
        fn labels(&self, prefix: String, count: u32) -> Vec<String>;
    }
}

struct HitGauge {
    label: Mutex<String>,
    hits: AtomicU64,
}

impl HitGauge {
    fn new(label: &str) -> Self {
        Self {
            label: Mutex::new(label.to_string()),
            hits: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Gauge for HitGauge {
    async fn hit(&self) -> Result<u64, InvocationError> {
        Ok(self.hits.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn rename(&self, label: String) -> Result<(), InvocationError> {
        if label.is_empty() {
            return Err(InvocationError::application("label must not be empty"));
        }
        *self.label.lock().unwrap() = label;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Snapshot, InvocationError> {
        Ok(Snapshot {
            label: self.label.lock().unwrap().clone(),
            hits: self.hits.load(Ordering::SeqCst),
        })
    }

    async fn labels(&self, prefix: String, count: u32) -> Result<Vec<String>, InvocationError> {
        Ok((0..count).map(|i| format!("{prefix}{i}")).collect())
    }
}

beacon_runtime::manageable!(HitGauge: Gauge);

fn gauge_name() -> QualifiedName {
    "metrics:type=Gauge".parse().unwrap()
}

/// Register a gauge the way bootstrap does: through its declared binding.
fn publish(directory: &Directory, gauge: Arc<HitGauge>) {
    let bindings = HitGauge::manageable_interfaces();
    assert_eq!(bindings.len(), 1);
    let instance: Arc<dyn Any + Send + Sync> = gauge;
    let object = bindings[0].adapt(instance).expect("binding accepts its own type");
    directory.register(gauge_name(), object).unwrap();
}

#[tokio::test]
async fn test_typed_proxy_round_trip() {
    let directory = Arc::new(Directory::new());
    publish(&directory, Arc::new(HitGauge::new("requests")));

    let gauge = create_proxy::<dyn Gauge>(gauge_name(), directory.clone());
    assert_eq!(gauge.hit().await.unwrap(), 1);
    assert_eq!(gauge.hit().await.unwrap(), 2);
    gauge.rename("responses".to_string()).await.unwrap();

    let snapshot = gauge.snapshot().await.unwrap();
    assert_eq!(
        snapshot,
        Snapshot {
            label: "responses".to_string(),
            hits: 2
        }
    );
    assert_eq!(
        gauge.labels("n".to_string(), 3).await.unwrap(),
        vec!["n0", "n1", "n2"]
    );
}

#[tokio::test]
async fn test_application_failure_reaches_caller() {
    let directory = Arc::new(Directory::new());
    publish(&directory, Arc::new(HitGauge::new("requests")));

    let gauge = create_proxy::<dyn Gauge>(gauge_name(), directory);
    let err = gauge.rename(String::new()).await.unwrap_err();
    assert!(matches!(err, InvocationError::Application(ref m) if m.contains("empty")));
}

#[tokio::test]
async fn test_registration_after_proxy_creation_is_visible() {
    let directory = Arc::new(Directory::new());
    let gauge = create_proxy::<dyn Gauge>(gauge_name(), directory.clone());
    assert!(gauge.hit().await.is_err());

    publish(&directory, Arc::new(HitGauge::new("late")));
    assert_eq!(gauge.hit().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_proxies_hit_one_object() {
    let directory = Arc::new(Directory::new());
    let target = Arc::new(HitGauge::new("shared"));
    publish(&directory, Arc::clone(&target));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let channel: Arc<dyn InvocationChannel> = directory.clone();
        tasks.push(tokio::spawn(async move {
            let gauge = create_proxy::<dyn Gauge>(gauge_name(), channel);
            for _ in 0..25 {
                gauge.hit().await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(target.hits.load(Ordering::SeqCst), 200);
}

#[test]
fn test_descriptor_shape() {
    let descriptor = <dyn Gauge as ManagedInterface>::descriptor();
    assert_eq!(descriptor.name, "Gauge");
    assert_eq!(descriptor.namespace, "directory_proxy_test");
    let labels = descriptor.method("labels").unwrap();
    assert_eq!(labels.param_types(), vec!["String", "u32"]);
    assert_eq!(labels.returns, "Vec<String>");
    let expected: QualifiedName = "directory_proxy_test:type=Gauge".parse().unwrap();
    assert_eq!(descriptor.default_name().unwrap(), expected);
}
