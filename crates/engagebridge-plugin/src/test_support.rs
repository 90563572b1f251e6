//! Recording fakes of the native SDK for unit tests

use crate::message::InboxMessage;
use crate::push::RemoteMessage;
use crate::sdk::*;
use async_trait::async_trait;
use engagebridge_channel::{HostSink, Messenger, ModuleRegistry, NativeModule};
use engagebridge_core::{Arguments, BridgeResult, MethodCall, MethodResult, SdkConfig};
use engagebridge_runtime::ImmediateDispatcher;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

pub fn immediate_messenger() -> Arc<Messenger> {
    Messenger::new(Arc::new(ImmediateDispatcher))
}

/// Register and attach `module` in a registry of its own
pub fn attach(module: Arc<dyn NativeModule>) -> ModuleRegistry {
    let registry = ModuleRegistry::new();
    registry.register(module).expect("register");
    registry.attach_all();
    registry
}

/// Send `method` to `channel` and capture the answer
pub fn call(messenger: &Messenger, channel: &str, method: &str, arguments: Value) -> MethodResult {
    let out = Arc::new(Mutex::new(None));
    let store = out.clone();
    messenger.handle_call(
        channel,
        MethodCall::new(method, arguments),
        Box::new(move |r| *store.lock() = Some(r)),
    );
    let result = out.lock().take();
    result.expect("call was not answered")
}

/// Events the bridge sent to the host
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<(String, MethodCall)>>>,
}

impl EventLog {
    pub fn install(messenger: &Messenger) -> Self {
        let log = Self::default();
        let events = log.events.clone();
        let sink: HostSink = Arc::new(move |channel: &str, event: &MethodCall| {
            events.lock().push((channel.to_string(), event.clone()));
        });
        messenger.set_host_sink(Some(sink));
        log
    }

    pub fn on(&self, channel: &str) -> Vec<MethodCall> {
        self.events
            .lock()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn named(&self, channel: &str, method: &str) -> Vec<Value> {
        self.on(channel)
            .into_iter()
            .filter(|e| e.method == method)
            .map(|e| e.arguments)
            .collect()
    }
}

#[derive(Default)]
pub struct FakePipeline {
    pub calls: Mutex<Vec<String>>,
    pub initialized: Mutex<Option<SdkConfig>>,
    pub token: Mutex<Option<String>>,
    pub fail_with: Mutex<Option<String>>,
}

impl FakePipeline {
    fn record(&self, entry: String) -> anyhow::Result<()> {
        if let Some(reason) = self.fail_with.lock().clone() {
            anyhow::bail!(reason);
        }
        self.calls.lock().push(entry);
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

fn describe(map: Option<&Arguments>) -> String {
    match map {
        Some(map) => Value::Object(map.clone()).to_string(),
        None => "-".to_string(),
    }
}

impl DataPipeline for FakePipeline {
    fn initialize(&self, config: &SdkConfig) -> anyhow::Result<()> {
        self.record("initialize".to_string())?;
        *self.initialized.lock() = Some(config.clone());
        Ok(())
    }

    fn identify(&self, user_id: &str, traits: Option<&Arguments>) -> anyhow::Result<()> {
        self.record(format!("identify {} {}", user_id, describe(traits)))
    }

    fn clear_identify(&self) -> anyhow::Result<()> {
        self.record("clearIdentify".to_string())
    }

    fn track(&self, name: &str, properties: Option<&Arguments>) -> anyhow::Result<()> {
        self.record(format!("track {} {}", name, describe(properties)))
    }

    fn screen(&self, title: &str, properties: Option<&Arguments>) -> anyhow::Result<()> {
        self.record(format!("screen {} {}", title, describe(properties)))
    }

    fn set_profile_attributes(&self, attributes: &Arguments) -> anyhow::Result<()> {
        self.record(format!("profile {}", describe(Some(attributes))))
    }

    fn set_device_attributes(&self, attributes: &Arguments) -> anyhow::Result<()> {
        self.record(format!("device {}", describe(Some(attributes))))
    }

    fn register_device_token(&self, token: &str) -> anyhow::Result<()> {
        self.record(format!("registerDeviceToken {}", token))?;
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn registered_device_token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn track_metric(&self, metric: &PushMetric) -> anyhow::Result<()> {
        self.record(format!(
            "trackMetric {} {} {}",
            metric.delivery_id, metric.device_token, metric.event
        ))
    }
}

#[derive(Default)]
pub struct FakeInbox {
    pub calls: Mutex<Vec<String>>,
    pub listeners: Mutex<Vec<Arc<dyn InboxChangeListener>>>,
    pub messages: Mutex<Vec<InboxMessage>>,
    pub fetch_error: Mutex<Option<String>>,
    /// Fetches never resolve while set
    pub stall_fetch: Mutex<bool>,
    pub registrations: Mutex<usize>,
}

impl FakeInbox {
    pub fn with_messages(messages: Vec<InboxMessage>) -> Arc<Self> {
        let inbox = Arc::new(Self::default());
        *inbox.messages.lock() = messages;
        inbox
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn emit(&self, messages: &[InboxMessage]) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_messages_changed(messages);
        }
    }
}

#[async_trait]
impl NotificationInbox for FakeInbox {
    fn add_change_listener(&self, listener: Arc<dyn InboxChangeListener>) {
        *self.registrations.lock() += 1;
        self.listeners.lock().push(listener);
    }

    fn remove_change_listener(&self, listener: &Arc<dyn InboxChangeListener>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    async fn fetch_messages(&self) -> anyhow::Result<Vec<InboxMessage>> {
        let stalled = *self.stall_fetch.lock();
        if stalled {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = self.fetch_error.lock().clone() {
            anyhow::bail!(reason);
        }
        Ok(self.messages.lock().clone())
    }

    fn mark_opened(&self, message: &InboxMessage) -> anyhow::Result<()> {
        self.calls.lock().push(format!("opened {}", message.queue_id));
        Ok(())
    }

    fn mark_unopened(&self, message: &InboxMessage) -> anyhow::Result<()> {
        self.calls.lock().push(format!("unopened {}", message.queue_id));
        Ok(())
    }

    fn mark_deleted(&self, message: &InboxMessage) -> anyhow::Result<()> {
        self.calls.lock().push(format!("deleted {}", message.queue_id));
        Ok(())
    }

    fn track_clicked(
        &self,
        message: &InboxMessage,
        action_name: Option<&str>,
    ) -> anyhow::Result<()> {
        self.calls.lock().push(format!(
            "clicked {} {}",
            message.queue_id,
            action_name.unwrap_or("-")
        ));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeInApp {
    pub inbox: Mutex<Option<Arc<FakeInbox>>>,
    pub listener: Mutex<Option<Arc<dyn InAppEventListener>>>,
    pub dismissed: Mutex<usize>,
}

impl FakeInApp {
    pub fn with_inbox(inbox: Arc<FakeInbox>) -> Arc<Self> {
        let in_app = Arc::new(Self::default());
        *in_app.inbox.lock() = Some(inbox);
        in_app
    }

    pub fn listener(&self) -> Option<Arc<dyn InAppEventListener>> {
        self.listener.lock().clone()
    }
}

impl InAppMessaging for FakeInApp {
    fn set_event_listener(&self, listener: Option<Arc<dyn InAppEventListener>>) {
        *self.listener.lock() = listener;
    }

    fn dismiss_message(&self) -> anyhow::Result<()> {
        *self.dismissed.lock() += 1;
        Ok(())
    }

    fn inbox(&self) -> Option<Arc<dyn NotificationInbox>> {
        self.inbox
            .lock()
            .clone()
            .map(|inbox| inbox as Arc<dyn NotificationInbox>)
    }
}

#[derive(Default)]
pub struct FakePush {
    pub received: Mutex<Vec<(RemoteMessage, bool)>>,
}

impl PushMessaging for FakePush {
    fn on_message_received(
        &self,
        message: &RemoteMessage,
        handle_notification_trigger: bool,
    ) -> anyhow::Result<bool> {
        self.received
            .lock()
            .push((message.clone(), handle_notification_trigger));
        Ok(true)
    }
}

/// Native inline host recording every call in order
#[derive(Default)]
pub struct FakeHost {
    pub calls: Mutex<Vec<String>>,
    pub delegate: Mutex<Option<Arc<dyn InlineMessageDelegate>>>,
    /// Elements rendered synchronously when bound
    pub renders: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn delegate(&self) -> Arc<dyn InlineMessageDelegate> {
        self.delegate.lock().clone().expect("no delegate installed")
    }

    pub fn render_on_bind(&self, element_id: &str) {
        self.renders.lock().push(element_id.to_string());
    }
}

impl InlineMessageHost for FakeHost {
    fn set_element_id(&self, element_id: Option<&str>) {
        self.calls
            .lock()
            .push(format!("set {}", element_id.unwrap_or("null")));

        let renders = element_id.is_some_and(|id| self.renders.lock().iter().any(|r| r == id));
        let delegate = self.delegate.lock().clone();
        if let (true, Some(delegate)) = (renders, delegate) {
            delegate.on_loading_started();
            delegate.on_loading_finished();
        }
    }

    fn set_delegate(&self, delegate: Option<Arc<dyn InlineMessageDelegate>>) {
        let label = if delegate.is_some() {
            "delegate"
        } else {
            "no delegate"
        };
        self.calls.lock().push(label.to_string());
        *self.delegate.lock() = delegate;
    }

    fn release(&self) {
        self.calls.lock().push("release".to_string());
    }
}

#[derive(Default)]
pub struct FakeHostFactory {
    pub hosts: Mutex<Vec<(i64, Arc<FakeHost>)>>,
}

impl FakeHostFactory {
    pub fn host(&self, view_id: i64) -> Arc<FakeHost> {
        self.hosts
            .lock()
            .iter()
            .find(|(id, _)| *id == view_id)
            .map(|(_, host)| host.clone())
            .expect("no host for view")
    }
}

impl InlineHostFactory for FakeHostFactory {
    fn create_host(&self, view_id: i64) -> BridgeResult<Arc<dyn InlineMessageHost>> {
        let host = Arc::new(FakeHost::default());
        self.hosts.lock().push((view_id, host.clone()));
        Ok(host)
    }
}
