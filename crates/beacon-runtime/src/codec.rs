//! Argument and result marshalling between typed calls and JSON values.

use beacon_types::{codes, InvocationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Canonical spelling of a Rust type as captured by `stringify!`
/// (`Vec < String >` becomes `Vec<String>`).
pub fn type_label(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Positional arguments of one incoming call.
pub struct Arguments {
    method: String,
    values: std::vec::IntoIter<Value>,
    consumed: usize,
}

impl Arguments {
    pub fn new(method: &str, values: Vec<Value>) -> Self {
        Self {
            method: method.to_string(),
            values: values.into_iter(),
            consumed: 0,
        }
    }

    /// Decode the next argument as `T`.
    pub fn take<T: DeserializeOwned>(&mut self, param: &str) -> Result<T, InvocationError> {
        let value = self.values.next().ok_or_else(|| {
            InvocationError::rejected(
                codes::BAD_REQUEST,
                format!("{}: missing argument `{param}`", self.method),
            )
        })?;
        self.consumed += 1;
        serde_json::from_value(value).map_err(|e| {
            InvocationError::rejected(
                codes::BAD_REQUEST,
                format!("{}: argument `{param}` is invalid: {e}", self.method),
            )
        })
    }

    /// Fail if the caller sent more arguments than the method declares.
    pub fn finish(self) -> Result<(), InvocationError> {
        let extra = self.values.len();
        if extra > 0 {
            return Err(InvocationError::rejected(
                codes::BAD_REQUEST,
                format!(
                    "{}: expected {} argument(s), got {}",
                    self.method,
                    self.consumed,
                    self.consumed + extra
                ),
            ));
        }
        Ok(())
    }
}

/// Encode one outgoing argument.
pub fn encode_arg<T: Serialize + ?Sized>(param: &str, value: &T) -> Result<Value, InvocationError> {
    serde_json::to_value(value)
        .map_err(|e| InvocationError::Marshal(format!("argument `{param}`: {e}")))
}

/// Encode the result of a local call.
pub fn encode_result<T: Serialize + ?Sized>(method: &str, value: &T) -> Result<Value, InvocationError> {
    serde_json::to_value(value)
        .map_err(|e| InvocationError::Marshal(format!("result of `{method}`: {e}")))
}

/// Decode the result of a remote call.
pub fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, InvocationError> {
    serde_json::from_value(value)
        .map_err(|e| InvocationError::Marshal(format!("result of `{method}`: {e}")))
}
