//! Error types for bridge operations

use serde_json::json;
use thiserror::Error;

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error code reported when the notification inbox cannot be reached yet
pub const INBOX_NOT_AVAILABLE: &str = "INBOX_NOT_AVAILABLE";

/// Error code reported when a call payload fails validation
pub const INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";

/// Error code reported when an inbox fetch completes with a failure
pub const FETCH_ERROR: &str = "FETCH_ERROR";

/// Error type for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A required argument is absent from the call payload
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// A payload was present but does not have the expected shape
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The native SDK has not been initialized, so the inbox is unreachable
    #[error("notification inbox is not available, ensure the SDK is initialized")]
    InboxNotAvailable,

    /// An asynchronous inbox fetch failed
    #[error("failed to fetch inbox messages: {0}")]
    FetchFailed(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Error raised by the native SDK
    #[error("native SDK error: {0}")]
    Native(String),

    /// An argument is present but holds a value the SDK does not accept
    #[error("unsupported {key}: '{value}'")]
    UnsupportedValue { key: String, value: String },

    /// A handler panicked while servicing a call
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// Runtime error (dispatcher or async runtime unavailable)
    #[error("runtime error: {0}")]
    RuntimeError(String),

    /// The call was abandoned before a result was produced
    #[error("call cancelled")]
    Cancelled,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns the code reported to the caller for a failed `method`
    ///
    /// Precondition and validation failures carry a named code so callers can
    /// tell "retry later" apart from "bad input"; everything else is reported
    /// under the method name.
    pub fn error_code(&self, method: &str) -> String {
        match self {
            BridgeError::InboxNotAvailable => INBOX_NOT_AVAILABLE.to_string(),
            BridgeError::InvalidArguments(_) => INVALID_ARGUMENTS.to_string(),
            BridgeError::FetchFailed(_) => FETCH_ERROR.to_string(),
            _ => method.to_string(),
        }
    }

    /// Short stable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::MissingArgument(_) => "missing_argument",
            BridgeError::InvalidArguments(_) => "invalid_arguments",
            BridgeError::InboxNotAvailable => "inbox_not_available",
            BridgeError::FetchFailed(_) => "fetch_failed",
            BridgeError::ConfigError(_) => "config_error",
            BridgeError::SerializationError(_) => "serialization_error",
            BridgeError::Native(_) => "native",
            BridgeError::UnsupportedValue { .. } => "unsupported_value",
            BridgeError::Panicked(_) => "panicked",
            BridgeError::RuntimeError(_) => "runtime_error",
            BridgeError::Cancelled => "cancelled",
            BridgeError::Internal(_) => "internal",
        }
    }

    /// Message reported to the caller
    ///
    /// Errors raised outside the bridge report their own text, without the
    /// bridge's prefix.
    pub fn message(&self) -> String {
        match self {
            BridgeError::Native(message) | BridgeError::Panicked(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Structured description sent as the failure `details`
    ///
    /// Precondition errors have nothing beyond their code, so they report none.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            BridgeError::InboxNotAvailable => None,
            other => Some(json!({
                "kind": other.kind(),
                "message": other.to_string(),
            })),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::SerializationError(err.to_string())
    }
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<BridgeError>() {
            Ok(bridge) => bridge,
            Err(other) => BridgeError::Native(format!("{other:#}")),
        }
    }
}
