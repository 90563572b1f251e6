//! Inline in-app message views
//!
//! Each embedded view owns a native [`InlineMessageHost`] and a channel named
//! `customer_io_inline_view_<viewId>`. The bridge observes the host's loading
//! callbacks, tracks the [`InlinePhase`], and forwards every state, size and
//! action event to the caller in callback order.
//!
//! Events are built under the view's state lock but emitted after it is
//! released, behind a per-view ordering guard. A host sink that runs inline
//! may therefore call back into the view.

use crate::sdk::{InAppMessage, InlineHostFactory, InlineMessageDelegate, InlineMessageHost};
use engagebridge_channel::{
    CallHandler, Messenger, MethodChannel, MethodTable, PendingReply, PlatformView,
    PlatformViewFactory,
};
use engagebridge_core::{BridgeResult, InlinePhase, MethodCall};
use engagebridge_transport::{invoke, invoke_no_args};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Weak};

/// View type under which the host creates inline message views
pub const INLINE_VIEW_TYPE: &str = "customer_io_inline_in_app_message_view";

/// Animation length reported when the host does not give one
pub const DEFAULT_SIZE_ANIMATION_MS: f64 = 200.0;

/// Channel name for the view with `view_id`
pub fn inline_channel_name(view_id: i64) -> String {
    format!("customer_io_inline_view_{}", view_id)
}

#[derive(Debug, Default)]
struct ViewState {
    phase: InlinePhase,
    element_id: Option<String>,
    last_height: Option<f64>,
    /// Host produced a loading callback since the last bind
    host_reported: bool,
    action_listener_bound: bool,
    disposed: bool,
}

type Event = (&'static str, Value);

static METHODS: Lazy<MethodTable<InlineMessageView>> = Lazy::new(|| {
    MethodTable::<InlineMessageView>::new()
        .sync("setElementId", |view, call| {
            invoke(
                call,
                |raw| Ok(raw.as_str().map(str::to_string)),
                |element_id| view.set_element_id(element_id),
            )
        })
        .sync("getElementId", |view, call| {
            invoke_no_args(call, || view.element_id())
        })
        .sync("cleanup", |view, call| invoke_no_args(call, || view.cleanup()))
});

/// Bridge between one native inline host and its channel
pub struct InlineMessageView {
    view_id: i64,
    channel: MethodChannel,
    host: Arc<dyn InlineMessageHost>,
    state: Mutex<ViewState>,
    /// Serializes event emission per view; re-entrant for host callbacks
    /// arriving on the emitting thread.
    event_order: ReentrantMutex<()>,
}

impl InlineMessageView {
    /// Create the view, bind its channel and observe the host
    ///
    /// A non-blank `elementId` in `creation_params` is applied immediately.
    pub fn create(
        view_id: i64,
        messenger: Arc<Messenger>,
        host: Arc<dyn InlineMessageHost>,
        creation_params: &Value,
    ) -> Arc<Self> {
        let view = Arc::new(Self {
            view_id,
            channel: MethodChannel::new(inline_channel_name(view_id), messenger),
            host,
            state: Mutex::new(ViewState::default()),
            event_order: ReentrantMutex::new(()),
        });

        let weak = Arc::downgrade(&view);
        let handler: CallHandler = Arc::new(move |call: MethodCall, reply: PendingReply| {
            match weak.upgrade() {
                Some(view) => view.handle_call(call, reply),
                None => reply.not_implemented(),
            }
        });
        view.channel.set_method_call_handler(Some(handler));

        view.host.set_delegate(Some(Arc::new(ViewDelegate {
            view: Arc::downgrade(&view),
        })));
        view.state.lock().action_listener_bound = true;

        let element_id = creation_params
            .get("elementId")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty());
        if let Some(element_id) = element_id {
            view.set_element_id(Some(element_id.to_string()));
        }

        tracing::debug!(view_id, "inline view created");
        view
    }

    pub fn view_id(&self) -> i64 {
        self.view_id
    }

    pub fn channel(&self) -> &MethodChannel {
        &self.channel
    }

    pub fn phase(&self) -> InlinePhase {
        self.state.lock().phase
    }

    pub fn element_id(&self) -> Option<String> {
        self.state.lock().element_id.clone()
    }

    pub fn is_action_listener_bound(&self) -> bool {
        self.state.lock().action_listener_bound
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Bind the host to `element_id`, or unbind it with `None`
    ///
    /// Setting an id always clears the host first so the native side
    /// re-registers, even when the id is unchanged. If the host reports
    /// nothing for the element, the caller still hears `NoMessageToDisplay`.
    pub fn set_element_id(&self, element_id: Option<String>) {
        {
            let mut state = self.state.lock();
            if state.disposed {
                tracing::debug!(view_id = self.view_id, "setElementId after cleanup ignored");
                return;
            }
            state.element_id = element_id.clone();
            state.host_reported = false;
        }

        // The host may call back synchronously, so no lock is held here.
        match element_id.as_deref() {
            Some(id) => {
                self.host.set_element_id(None);
                self.host.set_element_id(Some(id));
                self.report_if_silent();
            }
            None => self.host.set_element_id(None),
        }
    }

    /// Detach from the host and release it; later calls are no-ops
    pub fn cleanup(&self) {
        {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.action_listener_bound = false;
        }

        self.host.set_delegate(None);
        self.host.release();
        self.channel.set_method_call_handler(None);
        tracing::debug!(view_id = self.view_id, "inline view cleaned up");
    }

    fn handle_call(&self, call: MethodCall, reply: PendingReply) {
        METHODS.dispatch(self, &call, reply);
    }

    // Falls back only when the host said nothing since the last bind.
    fn report_if_silent(&self) {
        let _order = self.event_order.lock();
        let event = {
            let mut state = self.state.lock();
            if state.disposed || state.host_reported {
                return;
            }
            self.record_phase(&mut state, InlinePhase::NoMessageToDisplay)
        };
        self.emit(event);
    }

    fn transition(&self, target: InlinePhase) {
        let _order = self.event_order.lock();
        let event = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.host_reported = true;
            self.record_phase(&mut state, target)
        };
        self.emit(event);
    }

    // Every phase is forwarded; the transition table only flags odd sequences.
    fn record_phase(&self, state: &mut ViewState, target: InlinePhase) -> Option<Event> {
        if !state.phase.can_transition_to(target) {
            tracing::debug!(
                view_id = self.view_id,
                from = %state.phase,
                to = %target,
                "unexpected phase change"
            );
        }
        state.phase = target;
        target
            .event_name()
            .map(|name| ("onStateChange", json!({ "state": name })))
    }

    fn size_changed(&self, width: Option<f64>, height: f64, duration: Option<f64>) {
        let _order = self.event_order.lock();
        {
            let mut state = self.state.lock();
            if state.disposed || height <= 0.0 || state.last_height == Some(height) {
                return;
            }
            state.last_height = Some(height);
        }

        let mut payload = Map::new();
        payload.insert("height".into(), json!(height));
        if let Some(width) = width.filter(|w| *w > 0.0) {
            payload.insert("width".into(), json!(width));
        }
        payload.insert(
            "duration".into(),
            json!(duration.unwrap_or(DEFAULT_SIZE_ANIMATION_MS)),
        );
        self.emit(Some(("onSizeChange", Value::Object(payload))));
    }

    fn action(&self, message: &InAppMessage, action_value: &str, action_name: &str) {
        let _order = self.event_order.lock();
        if self.state.lock().disposed {
            return;
        }
        self.emit(Some((
            "onAction",
            json!({
                "actionValue": action_value,
                "actionName": action_name,
                "messageId": message.message_id,
                "deliveryId": message.delivery_id,
            }),
        )));
    }

    // Called with `event_order` held and `state` released, so a host sink may call
    // back into the view.
    fn emit(&self, event: Option<Event>) {
        if let Some((method, arguments)) = event {
            self.channel.invoke_method(method, arguments);
        }
    }
}

impl PlatformView for InlineMessageView {
    fn dispose(&self) {
        self.cleanup();
    }
}

/// Host callbacks routed to a view that may already be gone
struct ViewDelegate {
    view: Weak<InlineMessageView>,
}

impl InlineMessageDelegate for ViewDelegate {
    fn on_loading_started(&self) {
        if let Some(view) = self.view.upgrade() {
            view.transition(InlinePhase::LoadingStarted);
        }
    }

    fn on_loading_finished(&self) {
        if let Some(view) = self.view.upgrade() {
            view.transition(InlinePhase::LoadingFinished);
        }
    }

    fn on_no_message_to_display(&self) {
        if let Some(view) = self.view.upgrade() {
            view.transition(InlinePhase::NoMessageToDisplay);
        }
    }

    fn on_size_changed(&self, width: Option<f64>, height: f64, duration: Option<f64>) {
        if let Some(view) = self.view.upgrade() {
            view.size_changed(width, height, duration);
        }
    }

    fn on_action(&self, message: &InAppMessage, action_value: &str, action_name: &str) {
        if let Some(view) = self.view.upgrade() {
            view.action(message, action_value, action_name);
        }
    }
}

/// Creates [`InlineMessageView`]s for the platform view registry
pub struct InlineViewFactory {
    messenger: Arc<Messenger>,
    hosts: Arc<dyn InlineHostFactory>,
}

impl InlineViewFactory {
    pub fn new(messenger: Arc<Messenger>, hosts: Arc<dyn InlineHostFactory>) -> Self {
        Self { messenger, hosts }
    }
}

impl PlatformViewFactory for InlineViewFactory {
    fn create(&self, view_id: i64, creation_params: &Value) -> BridgeResult<Arc<dyn PlatformView>> {
        let host = self.hosts.create_host(view_id)?;
        let view = InlineMessageView::create(view_id, self.messenger.clone(), host, creation_params);
        Ok(view)
    }
}
