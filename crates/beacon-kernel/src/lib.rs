//! Bootstrap for Beacon managed objects.
//!
//! Applications describe what to publish with a [`BeaconModule`]: which
//! implementation types to register, under which names, and where the
//! connector listens. [`Manager::manage`] resolves every implementation
//! through a [`Resolver`], publishes it in the directory and starts the
//! connector. [`BeaconClient`] builds typed proxies for a remote directory.

pub mod client;
pub mod config;
pub mod error;
pub mod manager;
pub mod module;
pub mod resolver;

pub use client::BeaconClient;
pub use error::{KernelError, KernelResult};
pub use manager::Manager;
pub use module::{BeaconModule, Registration, RegistrationBuilder};
pub use resolver::{Bindings, Resolver};
