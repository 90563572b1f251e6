//! Inbox sync bridge
//!
//! Exposes the native notification inbox to the caller: subscription to
//! change notifications, one-shot fetches and per-message mutations.
//!
//! The change listener is owned by an [`InboxListenerRegistration`], an
//! explicit `Inactive`/`Active` state machine. Activation and deactivation run
//! under a single mutex, so repeated subscriptions register with the native
//! inbox at most once.

use crate::message::{InboxMessage, filter_by_topic};
use crate::sdk::{InAppMessaging, InboxChangeListener, NotificationInbox};
use engagebridge_channel::{MethodChannel, PendingReply};
use engagebridge_core::{BridgeError, BridgeResult};
use engagebridge_runtime::AsyncRuntime;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;

/// Event sent to the caller whenever the inbox content changes
pub const INBOX_MESSAGES_CHANGED: &str = "inboxMessagesChanged";

/// Forwards native inbox changes to the caller verbatim
struct InboxForwarder {
    channel: MethodChannel,
}

impl InboxChangeListener for InboxForwarder {
    fn on_messages_changed(&self, messages: &[InboxMessage]) {
        match serde_json::to_value(messages) {
            Ok(messages) => self
                .channel
                .invoke_method(INBOX_MESSAGES_CHANGED, json!({ "messages": messages })),
            Err(err) => tracing::error!("failed to encode inbox messages: {}", err),
        }
    }
}

enum Registration {
    Inactive,
    Active {
        inbox: Arc<dyn NotificationInbox>,
        listener: Arc<dyn InboxChangeListener>,
    },
}

/// Owner of the single inbox change listener
pub struct InboxListenerRegistration {
    state: Mutex<Registration>,
}

impl InboxListenerRegistration {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Registration::Inactive),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.state.lock(), Registration::Active { .. })
    }

    /// Register a forwarder for `channel` with `inbox`
    ///
    /// Returns `false` without touching the inbox if already active.
    pub fn activate(&self, inbox: Arc<dyn NotificationInbox>, channel: &MethodChannel) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, Registration::Active { .. }) {
            return false;
        }

        let listener: Arc<dyn InboxChangeListener> = Arc::new(InboxForwarder {
            channel: channel.clone(),
        });
        inbox.add_change_listener(listener.clone());
        *state = Registration::Active { inbox, listener };
        tracing::debug!("inbox listener registered");
        true
    }

    /// Remove the forwarder from the inbox it was registered with
    ///
    /// Returns `false` if nothing was registered.
    pub fn deactivate(&self) -> bool {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, Registration::Inactive) {
            Registration::Active { inbox, listener } => {
                inbox.remove_change_listener(&listener);
                tracing::debug!("inbox listener removed");
                true
            }
            Registration::Inactive => false,
        }
    }
}

impl Default for InboxListenerRegistration {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbox operations exposed on the in-app channel
pub struct InboxBridge {
    in_app: Arc<dyn InAppMessaging>,
    channel: MethodChannel,
    registration: InboxListenerRegistration,
    runtime: Arc<AsyncRuntime>,
}

impl InboxBridge {
    pub fn new(
        in_app: Arc<dyn InAppMessaging>,
        channel: MethodChannel,
        runtime: Arc<AsyncRuntime>,
    ) -> Self {
        Self {
            in_app,
            channel,
            registration: InboxListenerRegistration::new(),
            runtime,
        }
    }

    pub fn registration(&self) -> &InboxListenerRegistration {
        &self.registration
    }

    /// The native inbox, failing when the SDK is not initialized yet
    pub fn inbox(&self) -> BridgeResult<Arc<dyn NotificationInbox>> {
        self.in_app.inbox().ok_or(BridgeError::InboxNotAvailable)
    }

    /// Start forwarding inbox changes
    ///
    /// Before the SDK is initialized there is nothing to observe; the call
    /// still succeeds.
    pub fn subscribe(&self) {
        match self.in_app.inbox() {
            Some(inbox) => {
                self.registration.activate(inbox, &self.channel);
            }
            None => tracing::debug!("inbox not available yet, skipping listener setup"),
        }
    }

    /// Stop forwarding inbox changes
    pub fn unsubscribe(&self) {
        self.registration.deactivate();
    }

    /// Read the inbox asynchronously, answering through `reply`
    ///
    /// Also activates the change listener so later updates reach the caller.
    /// A runtime shutdown during the fetch answers with a fetch failure.
    pub fn fetch(&self, topic: Option<String>, reply: PendingReply) {
        let inbox = match self.inbox() {
            Ok(inbox) => inbox,
            Err(err) => return reply.error(&err),
        };
        self.registration.activate(inbox.clone(), &self.channel);

        if self.runtime.is_shutting_down() {
            return reply.error(&BridgeError::FetchFailed(
                "runtime is shutting down".to_string(),
            ));
        }

        let signal = self.runtime.shutdown_signal();
        let spawned = self.runtime.spawn(async move {
            let outcome = signal.run_until_shutdown(inbox.fetch_messages()).await;
            reply.complete(fetch_outcome(outcome, topic.as_deref()));
        });
        // A lost race with shutdown drops the future, and its reply answers cancelled.
        if let Err(err) = spawned {
            tracing::warn!("inbox fetch not started: {}", err);
        }
    }

    pub fn mark_opened(&self, message: Option<&Value>) -> BridgeResult<()> {
        let (inbox, message) = self.prepare(message)?;
        inbox.mark_opened(&message).map_err(Into::into)
    }

    pub fn mark_unopened(&self, message: Option<&Value>) -> BridgeResult<()> {
        let (inbox, message) = self.prepare(message)?;
        inbox.mark_unopened(&message).map_err(Into::into)
    }

    pub fn mark_deleted(&self, message: Option<&Value>) -> BridgeResult<()> {
        let (inbox, message) = self.prepare(message)?;
        inbox.mark_deleted(&message).map_err(Into::into)
    }

    pub fn track_clicked(
        &self,
        message: Option<&Value>,
        action_name: Option<&str>,
    ) -> BridgeResult<()> {
        let (inbox, message) = self.prepare(message)?;
        inbox.track_clicked(&message, action_name).map_err(Into::into)
    }

    // Availability is checked before the payload, and both before any native call.
    fn prepare(
        &self,
        message: Option<&Value>,
    ) -> BridgeResult<(Arc<dyn NotificationInbox>, InboxMessage)> {
        let inbox = self.inbox()?;
        let message = InboxMessage::from_value(message)?;
        Ok((inbox, message))
    }
}

fn fetch_outcome(
    outcome: Option<anyhow::Result<Vec<InboxMessage>>>,
    topic: Option<&str>,
) -> BridgeResult<Value> {
    match outcome {
        Some(Ok(messages)) => {
            let messages = filter_by_topic(messages, topic);
            serde_json::to_value(messages).map_err(Into::into)
        }
        Some(Err(err)) => Err(BridgeError::FetchFailed(format!("{:#}", err))),
        None => Err(BridgeError::FetchFailed(
            "runtime shut down before the fetch completed".to_string(),
        )),
    }
}
