//! Plugin Integration Tests
//!
//! These tests drive the plugin through the messenger the way a host does:
//! - initialization, tracking and push calls on a real UI thread
//! - inbox subscription, change forwarding and topic-filtered fetches
//! - inline views created through the platform view registry
//! - byte-level calls and concurrent fetches

#![allow(non_snake_case)]

use async_trait::async_trait;
use engagebridge_channel::{HostSink, Messenger};
use engagebridge_core::{
    Arguments, BridgeResult, INBOX_NOT_AVAILABLE, MethodCall, MethodResult, SdkConfig,
};
use engagebridge_plugin::prelude::*;
use engagebridge_plugin::{
    IN_APP_CHANNEL, INBOX_MESSAGES_CHANGED, INLINE_VIEW_TYPE, TRACKING_CHANNEL,
    inline_channel_name,
};
use engagebridge_runtime::{RuntimeConfig, UiThread};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Native SDK fakes
// ============================================================================

#[derive(Default)]
struct Pipeline {
    calls: Mutex<Vec<String>>,
}

impl Pipeline {
    fn push(&self, entry: String) -> anyhow::Result<()> {
        self.calls.lock().push(entry);
        Ok(())
    }
}

fn props(map: Option<&Arguments>) -> String {
    map.map(|m| Value::Object(m.clone()).to_string())
        .unwrap_or_else(|| "-".into())
}

impl DataPipeline for Pipeline {
    fn initialize(&self, config: &SdkConfig) -> anyhow::Result<()> {
        self.push(format!("initialize {}", config.effective_region().code()))
    }
    fn identify(&self, user_id: &str, traits: Option<&Arguments>) -> anyhow::Result<()> {
        self.push(format!("identify {} {}", user_id, props(traits)))
    }
    fn clear_identify(&self) -> anyhow::Result<()> {
        self.push("clearIdentify".into())
    }
    fn track(&self, name: &str, properties: Option<&Arguments>) -> anyhow::Result<()> {
        self.push(format!("track {} {}", name, props(properties)))
    }
    fn screen(&self, title: &str, properties: Option<&Arguments>) -> anyhow::Result<()> {
        self.push(format!("screen {} {}", title, props(properties)))
    }
    fn set_profile_attributes(&self, attributes: &Arguments) -> anyhow::Result<()> {
        self.push(format!("profile {}", props(Some(attributes))))
    }
    fn set_device_attributes(&self, attributes: &Arguments) -> anyhow::Result<()> {
        self.push(format!("device {}", props(Some(attributes))))
    }
    fn register_device_token(&self, token: &str) -> anyhow::Result<()> {
        self.push(format!("token {}", token))
    }
    fn registered_device_token(&self) -> Option<String> {
        None
    }
    fn track_metric(&self, metric: &PushMetric) -> anyhow::Result<()> {
        self.push(format!("metric {}", metric.event))
    }
}

#[derive(Default)]
struct Inbox {
    listeners: Mutex<Vec<Arc<dyn InboxChangeListener>>>,
    messages: Mutex<Vec<InboxMessage>>,
    opened: Mutex<Vec<String>>,
}

impl Inbox {
    fn emit(&self) {
        let messages = self.messages.lock().clone();
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_messages_changed(&messages);
        }
    }
}

#[async_trait]
impl NotificationInbox for Inbox {
    fn add_change_listener(&self, listener: Arc<dyn InboxChangeListener>) {
        self.listeners.lock().push(listener);
    }
    fn remove_change_listener(&self, listener: &Arc<dyn InboxChangeListener>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }
    async fn fetch_messages(&self) -> anyhow::Result<Vec<InboxMessage>> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(self.messages.lock().clone())
    }
    fn mark_opened(&self, message: &InboxMessage) -> anyhow::Result<()> {
        self.opened.lock().push(message.queue_id.clone());
        Ok(())
    }
    fn mark_unopened(&self, _message: &InboxMessage) -> anyhow::Result<()> {
        Ok(())
    }
    fn mark_deleted(&self, _message: &InboxMessage) -> anyhow::Result<()> {
        Ok(())
    }
    fn track_clicked(&self, _message: &InboxMessage, _action: Option<&str>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct InApp {
    inbox: Mutex<Option<Arc<Inbox>>>,
    listener: Mutex<Option<Arc<dyn InAppEventListener>>>,
}

impl InAppMessaging for InApp {
    fn set_event_listener(&self, listener: Option<Arc<dyn InAppEventListener>>) {
        *self.listener.lock() = listener;
    }
    fn dismiss_message(&self) -> anyhow::Result<()> {
        Ok(())
    }
    fn inbox(&self) -> Option<Arc<dyn NotificationInbox>> {
        self.inbox
            .lock()
            .clone()
            .map(|i| i as Arc<dyn NotificationInbox>)
    }
}

struct Push;

impl PushMessaging for Push {
    fn on_message_received(&self, message: &RemoteMessage, _trigger: bool) -> anyhow::Result<bool> {
        Ok(!message.data.is_empty())
    }
}

#[derive(Default)]
struct Host {
    calls: Mutex<Vec<String>>,
    delegate: Mutex<Option<Arc<dyn InlineMessageDelegate>>>,
}

impl InlineMessageHost for Host {
    fn set_element_id(&self, element_id: Option<&str>) {
        self.calls
            .lock()
            .push(element_id.unwrap_or("null").to_string());
    }
    fn set_delegate(&self, delegate: Option<Arc<dyn InlineMessageDelegate>>) {
        *self.delegate.lock() = delegate;
    }
    fn release(&self) {}
}

#[derive(Default)]
struct Hosts {
    created: Mutex<Vec<Arc<Host>>>,
}

impl InlineHostFactory for Hosts {
    fn create_host(&self, _view_id: i64) -> BridgeResult<Arc<dyn InlineMessageHost>> {
        let host = Arc::new(Host::default());
        self.created.lock().push(host.clone());
        Ok(host as Arc<dyn InlineMessageHost>)
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    plugin: EngagePlugin,
    pipeline: Arc<Pipeline>,
    in_app: Arc<InApp>,
    inbox: Arc<Inbox>,
    hosts: Arc<Hosts>,
    events: Mutex<mpsc::Receiver<(String, MethodCall)>>,
    _ui: Arc<UiThread>,
}

fn harness() -> Harness {
    let ui = Arc::new(UiThread::spawn("test-ui").unwrap());
    let messenger = Messenger::new(ui.clone());

    let (tx, events) = mpsc::channel();
    let tx = Mutex::new(tx);
    let sink: HostSink = Arc::new(move |channel: &str, event: &MethodCall| {
        let _ = tx.lock().send((channel.to_string(), event.clone()));
    });
    messenger.set_host_sink(Some(sink));

    let pipeline = Arc::new(Pipeline::default());
    let in_app = Arc::new(InApp::default());
    let inbox = Arc::new(Inbox::default());
    let hosts = Arc::new(Hosts::default());
    let sdk = NativeSdk {
        data_pipeline: pipeline.clone(),
        in_app: in_app.clone(),
        push: Arc::new(Push),
        inline_hosts: hosts.clone(),
    };
    let plugin = EngagePlugin::new(
        messenger,
        sdk,
        PluginOptions::new().with_runtime(RuntimeConfig::new().with_worker_threads(2)),
    )
    .unwrap();
    plugin.attach();

    Harness {
        plugin,
        pipeline,
        in_app,
        inbox,
        hosts,
        events: Mutex::new(events),
        _ui: ui,
    }
}

impl Harness {
    fn call(&self, channel: &str, method: &str, arguments: Value) -> MethodResult {
        let (tx, rx) = mpsc::channel();
        self.plugin.messenger().handle_call(
            channel,
            MethodCall::new(method, arguments),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.recv_timeout(TIMEOUT).unwrap()
    }

    fn next_event(&self) -> (String, MethodCall) {
        self.events.lock().recv_timeout(TIMEOUT).unwrap()
    }

    fn initialize_sdk(&self) {
        *self.in_app.inbox.lock() = Some(self.inbox.clone());
        let result = self.call(
            TRACKING_CHANNEL,
            "initialize",
            json!({"cdpApiKey": "key", "region": "EU", "inApp": {"siteId": "site"}}),
        );
        assert!(result.is_success());
    }
}

// ============================================================================
// Tracking
// ============================================================================

#[test]
fn tracking___initialize_then_track___reaches_pipeline_in_order() {
    let h = harness();

    h.initialize_sdk();
    h.call(TRACKING_CHANNEL, "identify", json!({"userId": "u1"}));
    h.call(TRACKING_CHANNEL, "track", json!({"name": "purchase", "properties": {}}));
    h.call(TRACKING_CHANNEL, "track", json!({"name": "purchase"}));

    assert_eq!(
        *h.pipeline.calls.lock(),
        vec![
            "initialize EU",
            "identify u1 -",
            "track purchase -",
            "track purchase -"
        ]
    );
}

#[test]
fn tracking___encoded_call___answers_encoded_result() {
    let h = harness();
    let (tx, rx) = mpsc::channel();

    h.plugin.messenger().handle_encoded(
        TRACKING_CHANNEL,
        br#"{"method": "screen", "arguments": {"title": "Home"}}"#,
        Box::new(move |bytes| {
            let _ = tx.send(bytes);
        }),
    );

    let bytes = rx.recv_timeout(TIMEOUT).unwrap();
    let result: MethodResult = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(result, MethodResult::success(json!(true)));
}

#[test]
fn push___on_message_received___answers_sdk_outcome() {
    let h = harness();

    let result = h.call(
        "customer_io_messaging_push",
        "onMessageReceived",
        json!({"message": {"data": {"link": "app://x"}}}),
    );

    assert_eq!(result, MethodResult::success(json!(true)));
}

// ============================================================================
// In-app and inbox
// ============================================================================

#[test]
fn in_app___global_listener___events_reach_host() {
    let h = harness();
    h.initialize_sdk();
    let listener = h.in_app.listener.lock().clone().unwrap();

    listener.message_shown(&InAppMessage::new("m-1", None));

    let (channel, event) = h.next_event();
    assert_eq!(channel, IN_APP_CHANNEL);
    assert_eq!(event.method, "messageShown");
    assert_eq!(event.arguments, json!({"messageId": "m-1", "deliveryId": null}));
}

#[test]
fn inbox___mutation_before_init___inbox_not_available() {
    let h = harness();

    let result = h.call(
        IN_APP_CHANNEL,
        "markInboxMessageOpened",
        json!({"message": {"queueId": "q", "sentAt": 1}}),
    );

    assert_eq!(result.error_info().unwrap().code, INBOX_NOT_AVAILABLE);
    assert!(h.inbox.opened.lock().is_empty());
}

#[test]
fn inbox___subscribe_then_change___forwards_messages() {
    let h = harness();
    h.initialize_sdk();
    *h.inbox.messages.lock() = vec![InboxMessage::new("q-1", 100)];

    h.call(IN_APP_CHANNEL, "subscribeToInboxMessages", Value::Null);
    h.call(IN_APP_CHANNEL, "subscribeToInboxMessages", Value::Null);
    h.inbox.emit();

    assert_eq!(h.inbox.listeners.lock().len(), 1);
    let (channel, event) = h.next_event();
    assert_eq!(channel, IN_APP_CHANNEL);
    assert_eq!(event.method, INBOX_MESSAGES_CHANGED);
    assert_eq!(event.arguments["messages"][0]["queueId"], "q-1");
}

#[test]
fn inbox___topic_filtered_fetch___returns_matching_messages() {
    let h = harness();
    h.initialize_sdk();
    *h.inbox.messages.lock() = vec![
        InboxMessage::new("a", 1).with_topics(["promo"]),
        InboxMessage::new("b", 2).with_topics(["news"]),
        InboxMessage::new("c", 3).with_topics(["Promo"]),
    ];

    let result = h.call(IN_APP_CHANNEL, "fetchInboxMessages", json!({"topic": "promo"}));

    let ids: Vec<_> = result
        .value()
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["queueId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn inbox___concurrent_fetches___each_answered_once() {
    let h = Arc::new(harness());
    h.initialize_sdk();
    *h.inbox.messages.lock() = vec![InboxMessage::new("a", 1)];
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let h = h.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                h.call(IN_APP_CHANNEL, "fetchInboxMessages", Value::Null)
            })
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert_eq!(result.value().unwrap().as_array().unwrap().len(), 1);
    }
    assert_eq!(h.inbox.listeners.lock().len(), 1);
}

// ============================================================================
// Inline views
// ============================================================================

#[test]
fn inline___same_element_twice___clears_then_sets_each_time() {
    let h = harness();
    h.plugin
        .create_view(INLINE_VIEW_TYPE, 1, &json!({"elementId": "hero"}))
        .unwrap();

    h.call(&inline_channel_name(1), "setElementId", json!("hero"));

    let host = h.hosts.created.lock()[0].clone();
    assert_eq!(*host.calls.lock(), vec!["null", "hero", "null", "hero"]);
}

#[test]
fn inline___size_updates___deduplicated_in_callback_order() {
    let h = harness();
    h.plugin.create_view(INLINE_VIEW_TYPE, 2, &json!({})).unwrap();
    let host = h.hosts.created.lock()[0].clone();
    let delegate = host.delegate.lock().clone().unwrap();

    for height in [0.0, 0.0, 120.0, 120.0, 150.0] {
        delegate.on_size_changed(None, height, None);
    }

    let first = h.next_event();
    let second = h.next_event();
    assert_eq!(first.0, inline_channel_name(2));
    assert_eq!(first.1.arguments["height"], 120.0);
    assert_eq!(second.1.arguments["height"], 150.0);
    assert!(h.events.lock().recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn inline___cleanup_over_channel___unbinds_view() {
    let h = harness();
    h.plugin.create_view(INLINE_VIEW_TYPE, 3, &json!({})).unwrap();

    let result = h.call(&inline_channel_name(3), "cleanup", Value::Null);
    let after = h.call(&inline_channel_name(3), "getElementId", Value::Null);

    assert!(result.is_success());
    assert!(after.is_not_implemented());
}
