//! Named method channels

use crate::messenger::{CallHandler, Messenger};
use engagebridge_core::MethodCall;
use engagebridge_runtime::SharedDispatcher;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named, bidirectional channel on a [`Messenger`]
///
/// Incoming calls go to the handler set with
/// [`MethodChannel::set_method_call_handler`]; outgoing events are sent with
/// [`MethodChannel::invoke_method`].
#[derive(Clone)]
pub struct MethodChannel {
    name: String,
    messenger: Arc<Messenger>,
}

impl MethodChannel {
    pub fn new(name: impl Into<String>, messenger: Arc<Messenger>) -> Self {
        Self {
            name: name.into(),
            messenger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn messenger(&self) -> &Arc<Messenger> {
        &self.messenger
    }

    /// The UI dispatcher this channel marshals through
    pub fn dispatcher(&self) -> SharedDispatcher {
        self.messenger.dispatcher()
    }

    /// Bind (or with `None`, unbind) the channel's sole call handler
    pub fn set_method_call_handler(&self, handler: Option<CallHandler>) {
        self.messenger.set_handler(&self.name, handler);
    }

    /// Check whether a call handler is bound
    pub fn has_handler(&self) -> bool {
        self.messenger.has_handler(&self.name)
    }

    /// Send an event to the host on this channel
    pub fn invoke_method(&self, method: &str, arguments: Value) {
        self.messenger
            .send_event(&self.name, MethodCall::new(method, arguments));
    }
}

impl fmt::Debug for MethodChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodChannel")
            .field("name", &self.name)
            .finish()
    }
}
