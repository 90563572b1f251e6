//! Call and result types crossing the bridge boundary

use crate::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request from the caller, addressed to one channel
///
/// Calls are immutable once received; handlers read the arguments through
/// [`MethodCall::arguments`] or take an owned copy with
/// [`MethodCall::arguments_map`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name used to route the call
    pub method: String,

    /// Untyped payload, `null` when the caller passed nothing
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// Create a new call
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Create a call that carries no arguments
    pub fn without_arguments(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Borrow the raw payload
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    /// Owned copy of the payload as a string-keyed map
    ///
    /// Anything other than a map yields an empty map.
    pub fn arguments_map(&self) -> Map<String, Value> {
        match &self.arguments {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }
}

/// Failure information returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodError {
    /// Error code: the failed method name, or a named precondition code
    pub code: String,
    /// Human-readable reason
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl MethodError {
    /// Create an error without details
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Build the error reported for a failed `method`
    pub fn from_bridge_error(method: &str, err: &BridgeError) -> Self {
        Self {
            code: err.error_code(method),
            message: err.message(),
            details: err.details(),
        }
    }
}

/// Outcome of a call, exactly one per [`MethodCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResult {
    /// Call completed with a value
    Success {
        #[serde(default)]
        value: Value,
    },
    /// Call failed
    Error(MethodError),
    /// The channel is up but no handler exists for the method
    NotImplemented,
}

impl MethodResult {
    /// Successful result carrying `value`
    pub fn success(value: Value) -> Self {
        MethodResult::Success { value }
    }

    /// Failed result
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResult::Error(MethodError::new(code, message))
    }

    /// Failed result for `method` built from a bridge error
    pub fn from_error(method: &str, err: &BridgeError) -> Self {
        MethodResult::Error(MethodError::from_bridge_error(method, err))
    }

    /// Check if this is a success result
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResult::Success { .. })
    }

    /// Check if the method was not implemented
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, MethodResult::NotImplemented)
    }

    /// Get the value if this is a success result
    pub fn value(&self) -> Option<&Value> {
        match self {
            MethodResult::Success { value } => Some(value),
            _ => None,
        }
    }

    /// Get the error if this is a failure
    pub fn error_info(&self) -> Option<&MethodError> {
        match self {
            MethodResult::Error(err) => Some(err),
            _ => None,
        }
    }
}
