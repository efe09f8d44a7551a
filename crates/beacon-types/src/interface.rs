//! Interface, method and type descriptors.
//!
//! An [`InterfaceDescriptor`] is the runtime description of a manageable
//! contract: its namespace, simple name and method signatures. Descriptors
//! travel over the wire so that tooling can call objects it has no compiled
//! interface for.

use crate::error::BeaconError;
use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::fmt;

/// One method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name as declared.
    pub name: String,
    /// Rust type of the parameter, as written in the declaration.
    #[serde(rename = "type")]
    pub ty: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// One method of a manageable interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
    /// Rust type of the successful result.
    pub returns: String,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: Vec<ParamSpec>, returns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params,
            returns: returns.into(),
        }
    }

    /// Parameter types in order; this is what a caller sends as the
    /// signature of an invocation.
    pub fn param_types(&self) -> Vec<String> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Whether `signature` matches this method's parameter types exactly.
    pub fn accepts(&self, signature: &[String]) -> bool {
        self.params.len() == signature.len()
            && self.params.iter().zip(signature).all(|(p, s)| p.ty == *s)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

/// Runtime description of a manageable interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// Dotted namespace, e.g. `beacon_cli.demo`.
    pub namespace: String,
    /// Simple interface name, e.g. `Hello`.
    pub name: String,
    /// Declared methods.
    pub methods: Vec<MethodSignature>,
}

impl InterfaceDescriptor {
    /// Build a descriptor. `module_path` may be a Rust module path
    /// (`a::b`); it is stored in dotted form (`a.b`).
    pub fn new(module_path: &str, name: impl Into<String>, methods: Vec<MethodSignature>) -> Self {
        Self {
            namespace: module_path.replace("::", "."),
            name: name.into(),
            methods,
        }
    }

    /// Find a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// `namespace.Name`, used in diagnostics.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// The name an object implementing this interface is published under
    /// when no override is given: domain = namespace, type = simple name.
    pub fn default_name(&self) -> Result<QualifiedName, BeaconError> {
        QualifiedName::new(self.namespace.clone(), self.name.clone())
    }
}

/// Identity of an implementation type, used to ask a resolver for an
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> InterfaceDescriptor {
        InterfaceDescriptor::new(
            "beacon_cli::demo",
            "Hello",
            vec![MethodSignature::new(
                "say_hello",
                vec![ParamSpec::new("name", "String")],
                "String",
            )],
        )
    }

    #[test]
    fn test_namespace_is_dotted() {
        let iface = hello();
        assert_eq!(iface.namespace, "beacon_cli.demo");
        assert_eq!(iface.full_name(), "beacon_cli.demo.Hello");
        assert_eq!(
            iface.default_name().unwrap().to_string(),
            "beacon_cli.demo:type=Hello"
        );
    }

    #[test]
    fn test_signature_matching() {
        let iface = hello();
        let method = iface.method("say_hello").unwrap();
        assert!(method.accepts(&["String".to_string()]));
        assert!(!method.accepts(&[]));
        assert!(!method.accepts(&["u32".to_string()]));
        assert!(iface.method("missing").is_none());
        assert_eq!(method.to_string(), "say_hello(name: String) -> String");
    }

    #[test]
    fn test_descriptor_json_shape() {
        let json = serde_json::to_value(hello()).unwrap();
        assert_eq!(json["methods"][0]["params"][0]["type"], "String");
        let back: InterfaceDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, hello());
    }

    #[test]
    fn test_type_descriptor() {
        struct Sample;
        let a = TypeDescriptor::of::<Sample>();
        let b = TypeDescriptor::of::<Sample>();
        assert_eq!(a, b);
        assert!(a.name().ends_with("Sample"));
        assert_ne!(a, TypeDescriptor::of::<String>());
    }
}
