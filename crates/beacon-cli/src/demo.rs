//! Objects published by `beacon serve`.

use async_trait::async_trait;
use beacon_runtime::InvocationError;
use std::sync::atomic::{AtomicU64, Ordering};

beacon_runtime::managed_interface! {
    /// Greets people.
    pub trait Hello {
        fn say_hello(&self, name: String) -> String;
    }
}

beacon_runtime::managed_interface! {
    /// A shared counter.
    pub trait Counter {
        fn increment(&self) -> u64;
        fn add(&self, amount: u64) -> u64;
        fn get(&self) -> u64;
        fn reset(&self) -> ();
    }
}

pub struct HelloImpl;

#[async_trait]
impl Hello for HelloImpl {
    async fn say_hello(&self, name: String) -> Result<String, InvocationError> {
        Ok(format!("Hello {name}"))
    }
}

beacon_runtime::manageable!(HelloImpl: Hello);

#[derive(Default)]
pub struct CounterImpl {
    value: AtomicU64,
}

#[async_trait]
impl Counter for CounterImpl {
    async fn increment(&self) -> Result<u64, InvocationError> {
        self.add(1).await
    }

    async fn add(&self, amount: u64) -> Result<u64, InvocationError> {
        let previous = self.value.fetch_add(amount, Ordering::SeqCst);
        Ok(previous.wrapping_add(amount))
    }

    async fn get(&self) -> Result<u64, InvocationError> {
        Ok(self.value.load(Ordering::SeqCst))
    }

    async fn reset(&self) -> Result<(), InvocationError> {
        self.value.store(0, Ordering::SeqCst);
        Ok(())
    }
}

beacon_runtime::manageable!(CounterImpl: Counter);
