//! Traits implemented by the native engagement SDK
//!
//! The bridge never reaches a concrete SDK directly. The host injects
//! implementations of these traits through [`NativeSdk`] when building the
//! plugin, and tests inject recording fakes. Fallible operations return
//! `anyhow::Result` so SDK errors keep their context until the envelope turns
//! them into a failure.

use crate::message::InboxMessage;
use crate::push::RemoteMessage;
use async_trait::async_trait;
use engagebridge_core::{Arguments, BridgeResult, SdkConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Delivery metric reported for a push notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricEvent {
    Delivered,
    Opened,
    Converted,
    Clicked,
}

impl MetricEvent {
    /// Parse a metric name case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "delivered" => Some(MetricEvent::Delivered),
            "opened" => Some(MetricEvent::Opened),
            "converted" => Some(MetricEvent::Converted),
            "clicked" => Some(MetricEvent::Clicked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricEvent::Delivered => "delivered",
            MetricEvent::Opened => "opened",
            MetricEvent::Converted => "converted",
            MetricEvent::Clicked => "clicked",
        }
    }
}

impl fmt::Display for MetricEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A push metric bound to one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMetric {
    pub delivery_id: String,
    pub device_token: String,
    pub event: MetricEvent,
}

/// Identity of an in-app message as reported by the SDK
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InAppMessage {
    pub message_id: String,
    pub delivery_id: Option<String>,
}

impl InAppMessage {
    pub fn new(message_id: impl Into<String>, delivery_id: Option<String>) -> Self {
        Self {
            message_id: message_id.into(),
            delivery_id,
        }
    }
}

/// Core data pipeline: identification, events and device registration
pub trait DataPipeline: Send + Sync {
    fn initialize(&self, config: &SdkConfig) -> anyhow::Result<()>;

    /// Identify a profile, optionally attaching traits
    fn identify(&self, user_id: &str, traits: Option<&Arguments>) -> anyhow::Result<()>;

    fn clear_identify(&self) -> anyhow::Result<()>;

    fn track(&self, name: &str, properties: Option<&Arguments>) -> anyhow::Result<()>;

    fn screen(&self, title: &str, properties: Option<&Arguments>) -> anyhow::Result<()>;

    fn set_profile_attributes(&self, attributes: &Arguments) -> anyhow::Result<()>;

    fn set_device_attributes(&self, attributes: &Arguments) -> anyhow::Result<()>;

    fn register_device_token(&self, token: &str) -> anyhow::Result<()>;

    /// Token registered with the SDK, if any
    fn registered_device_token(&self) -> Option<String>;

    fn track_metric(&self, metric: &PushMetric) -> anyhow::Result<()>;
}

/// Receives global in-app message lifecycle callbacks
pub trait InAppEventListener: Send + Sync {
    fn message_shown(&self, message: &InAppMessage);

    fn message_dismissed(&self, message: &InAppMessage);

    fn error_with_message(&self, message: &InAppMessage);

    fn message_action_taken(&self, message: &InAppMessage, action_value: &str, action_name: &str);
}

/// In-app messaging module of the SDK
pub trait InAppMessaging: Send + Sync {
    /// Install (or with `None`, remove) the global event listener
    fn set_event_listener(&self, listener: Option<Arc<dyn InAppEventListener>>);

    /// Dismiss the message currently on screen
    fn dismiss_message(&self) -> anyhow::Result<()>;

    /// The notification inbox, or `None` until the SDK is initialized
    fn inbox(&self) -> Option<Arc<dyn NotificationInbox>>;
}

/// Observer of inbox content changes
pub trait InboxChangeListener: Send + Sync {
    fn on_messages_changed(&self, messages: &[InboxMessage]);
}

/// Notification inbox owned by the in-app module
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    fn add_change_listener(&self, listener: Arc<dyn InboxChangeListener>);

    /// Remove a listener previously added; matched by identity
    fn remove_change_listener(&self, listener: &Arc<dyn InboxChangeListener>);

    /// Read every message currently in the inbox
    async fn fetch_messages(&self) -> anyhow::Result<Vec<InboxMessage>>;

    fn mark_opened(&self, message: &InboxMessage) -> anyhow::Result<()>;

    fn mark_unopened(&self, message: &InboxMessage) -> anyhow::Result<()>;

    fn mark_deleted(&self, message: &InboxMessage) -> anyhow::Result<()>;

    fn track_clicked(&self, message: &InboxMessage, action_name: Option<&str>)
    -> anyhow::Result<()>;
}

/// Push messaging module of the SDK
pub trait PushMessaging: Send + Sync {
    /// Process a push received outside the SDK
    ///
    /// Returns whether the SDK handled the message.
    fn on_message_received(
        &self,
        message: &RemoteMessage,
        handle_notification_trigger: bool,
    ) -> anyhow::Result<bool>;
}

/// Callbacks from a native inline message host
pub trait InlineMessageDelegate: Send + Sync {
    fn on_loading_started(&self);

    fn on_loading_finished(&self);

    fn on_no_message_to_display(&self);

    /// The rendered content changed size; `duration` is the animation length in ms
    fn on_size_changed(&self, width: Option<f64>, height: f64, duration: Option<f64>);

    fn on_action(&self, message: &InAppMessage, action_value: &str, action_name: &str);
}

/// Native view that renders inline in-app messages for one element
pub trait InlineMessageHost: Send + Sync {
    /// Bind the host to an element, or unbind it with `None`
    fn set_element_id(&self, element_id: Option<&str>);

    /// Install or remove the callback delegate
    fn set_delegate(&self, delegate: Option<Arc<dyn InlineMessageDelegate>>);

    /// Release the native view
    fn release(&self);
}

/// Creates native inline message hosts
pub trait InlineHostFactory: Send + Sync {
    fn create_host(&self, view_id: i64) -> BridgeResult<Arc<dyn InlineMessageHost>>;
}

/// The native SDK surface handed to the plugin
#[derive(Clone)]
pub struct NativeSdk {
    pub data_pipeline: Arc<dyn DataPipeline>,
    pub in_app: Arc<dyn InAppMessaging>,
    pub push: Arc<dyn PushMessaging>,
    pub inline_hosts: Arc<dyn InlineHostFactory>,
}

impl fmt::Debug for NativeSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSdk").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "sdk/sdk_parameterized_tests.rs"]
mod sdk_parameterized_tests;
