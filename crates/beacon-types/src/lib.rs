//! Core types for Beacon managed objects.
//!
//! This crate defines the data structures shared by the directory, the
//! connector and the proxy factory: qualified names, interface descriptors,
//! endpoint configuration and error kinds. It contains no business logic.

pub mod config;
pub mod error;
pub mod interface;
pub mod name;

pub use config::{BeaconConfig, Endpoint, DISABLED_PORT};
pub use error::{codes, BeaconError, InvocationError};
pub use interface::{InterfaceDescriptor, MethodSignature, ParamSpec, TypeDescriptor};
pub use name::QualifiedName;
