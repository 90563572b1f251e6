//! One-shot reply handles

use engagebridge_core::{BridgeError, BridgeResult, MethodResult};
use engagebridge_runtime::SharedDispatcher;
use engagebridge_transport::into_result;
use serde_json::Value;
use std::fmt;

/// Host-side completion for a single call
pub type ReplyFn = Box<dyn FnOnce(MethodResult) + Send + 'static>;

/// Answers one call exactly once, on the UI thread
///
/// The handle may be moved to another thread and completed later, which is
/// how asynchronous operations such as inbox fetches answer. Dropping an
/// unanswered handle answers the call with a failure, so the caller is never
/// left waiting.
pub struct PendingReply {
    method: String,
    responder: Option<ReplyFn>,
    dispatcher: SharedDispatcher,
}

impl PendingReply {
    /// Create a reply handle for `method`
    pub fn new(method: impl Into<String>, dispatcher: SharedDispatcher, responder: ReplyFn) -> Self {
        Self {
            method: method.into(),
            responder: Some(responder),
            dispatcher,
        }
    }

    /// Method this handle answers
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Send `result` to the caller
    pub fn send(mut self, result: MethodResult) {
        self.deliver(result);
    }

    /// Answer with a success value
    pub fn success(self, value: Value) {
        self.send(MethodResult::success(value));
    }

    /// Answer with a failure
    pub fn error(self, err: &BridgeError) {
        let result = MethodResult::from_error(&self.method, err);
        self.send(result);
    }

    /// Answer with the not-implemented outcome
    pub fn not_implemented(self) {
        self.send(MethodResult::NotImplemented);
    }

    /// Answer from a handler outcome
    pub fn complete(self, outcome: BridgeResult<Value>) {
        let result = into_result(&self.method, outcome);
        self.send(result);
    }

    fn deliver(&mut self, result: MethodResult) {
        if let Some(responder) = self.responder.take() {
            self.dispatcher.dispatch(Box::new(move || responder(result)));
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.responder.is_some() {
            tracing::warn!(method = %self.method, "call dropped without a reply");
            let result = MethodResult::from_error(&self.method, &BridgeError::Cancelled);
            self.deliver(result);
        }
    }
}

impl fmt::Debug for PendingReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReply")
            .field("method", &self.method)
            .field("answered", &self.responder.is_none())
            .finish()
    }
}
