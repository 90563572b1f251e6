//! Routing of calls and events between the host and named channels

use crate::reply::{PendingReply, ReplyFn};
use dashmap::DashMap;
use engagebridge_core::{BridgeError, MethodCall, MethodResult};
use engagebridge_runtime::SharedDispatcher;
use engagebridge_transport::{Codec, JsonCodec, catch_panic};
use parking_lot::RwLock;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Handler bound to one channel
pub type CallHandler = Arc<dyn Fn(MethodCall, PendingReply) + Send + Sync + 'static>;

/// Host function receiving bridge-originated events
///
/// Called on the UI thread with the channel name and the event.
pub type HostSink = Arc<dyn Fn(&str, &MethodCall) + Send + Sync + 'static>;

/// Switchboard between the host engine and the bridge's channels
///
/// The host delivers calls through [`Messenger::handle_call`]; the bridge
/// emits events through [`Messenger::send_event`]. Both directions reach the
/// host only via the UI dispatcher.
pub struct Messenger {
    handlers: DashMap<String, CallHandler>,
    host: RwLock<Option<HostSink>>,
    dispatcher: SharedDispatcher,
    codec: JsonCodec,
}

impl Messenger {
    /// Create a messenger that marshals through `dispatcher`
    pub fn new(dispatcher: SharedDispatcher) -> Arc<Self> {
        Arc::new(Self {
            handlers: DashMap::new(),
            host: RwLock::new(None),
            dispatcher,
            codec: JsonCodec::new(),
        })
    }

    /// The UI dispatcher shared by every channel
    pub fn dispatcher(&self) -> SharedDispatcher {
        self.dispatcher.clone()
    }

    /// Install or remove the host event sink
    pub fn set_host_sink(&self, sink: Option<HostSink>) {
        *self.host.write() = sink;
    }

    /// Bind or unbind the handler for `channel`
    ///
    /// A channel has at most one handler; binding replaces any previous one.
    pub fn set_handler(&self, channel: &str, handler: Option<CallHandler>) {
        match handler {
            Some(handler) => {
                self.handlers.insert(channel.to_string(), handler);
            }
            None => {
                self.handlers.remove(channel);
            }
        }
    }

    /// Check whether `channel` currently has a handler
    pub fn has_handler(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    /// Number of bound channels
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Deliver a host call to the handler bound to `channel`
    ///
    /// `reply` is invoked exactly once on the UI thread. A channel without a
    /// handler answers not-implemented.
    pub fn handle_call(&self, channel: &str, call: MethodCall, reply: ReplyFn) {
        let pending = PendingReply::new(call.method.clone(), self.dispatcher.clone(), reply);

        // Clone out so the map shard is not locked while the handler runs.
        let handler = self.handlers.get(channel).map(|entry| entry.value().clone());
        let Some(handler) = handler else {
            tracing::debug!(channel, method = %call.method, "no handler bound");
            pending.not_implemented();
            return;
        };

        let method = call.method.clone();
        if let Err(err) = catch_panic(AssertUnwindSafe(move || handler(call, pending))) {
            tracing::error!(channel, method = %method, "handler panicked: {}", err);
        }
    }

    /// Byte-level entry point: decode a JSON call, dispatch it, encode the result
    ///
    /// A payload that cannot be decoded is answered with a failure whose code
    /// is the channel name.
    pub fn handle_encoded(
        &self,
        channel: &str,
        payload: &[u8],
        reply: Box<dyn FnOnce(Vec<u8>) + Send + 'static>,
    ) {
        let codec = self.codec.clone();
        let encode_reply: ReplyFn = Box::new(move |result| {
            let bytes = codec.encode_result(&result).unwrap_or_else(|err| {
                tracing::error!("failed to encode result: {}", err);
                br#"{"status":"error","code":"encode","message":"failed to encode result"}"#
                    .to_vec()
            });
            reply(bytes);
        });

        match self.codec.decode_call(payload) {
            Ok(call) => self.handle_call(channel, call, encode_reply),
            Err(err) => {
                let err = BridgeError::from(err);
                tracing::warn!(channel, "undecodable call: {}", err);
                let result = MethodResult::from_error(channel, &err);
                self.dispatcher.dispatch(Box::new(move || encode_reply(result)));
            }
        }
    }

    /// Emit an event to the host on `channel`
    ///
    /// Events are queued on the UI dispatcher in call order. Without a host
    /// sink the event is dropped.
    pub fn send_event(&self, channel: &str, event: MethodCall) {
        let sink = self.host.read().clone();
        let Some(sink) = sink else {
            tracing::debug!(channel, method = %event.method, "no host sink, event dropped");
            return;
        };

        let channel = channel.to_string();
        self.dispatcher
            .dispatch(Box::new(move || sink(&channel, &event)));
    }
}
