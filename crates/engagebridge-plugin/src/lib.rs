//! engagebridge-plugin - Engagement SDK modules behind method channels
//!
//! This crate provides the plugin itself:
//! - [`sdk`] traits the host implements to reach the native SDK
//! - [`TrackingModule`], [`PushModule`] and [`InAppModule`] serving the
//!   `customer_io*` channels
//! - [`InboxBridge`] for inbox subscription, fetches and mutations
//! - [`InlineMessageView`] and its factory for embedded inline messages
//! - [`EngagePlugin`], the root that wires everything together

mod in_app;
mod inbox;
mod inline;
mod message;
mod plugin;
mod push;
pub mod sdk;
mod tracking;

#[cfg(test)]
mod test_support;

pub use in_app::{IN_APP_CHANNEL, InAppModule};
pub use inbox::{INBOX_MESSAGES_CHANGED, InboxBridge, InboxListenerRegistration};
pub use inline::{
    DEFAULT_SIZE_ANIMATION_MS, INLINE_VIEW_TYPE, InlineMessageView, InlineViewFactory,
    inline_channel_name,
};
pub use message::{InboxMessage, filter_by_topic};
pub use plugin::{EngagePlugin, PluginOptions};
pub use push::{PUSH_CHANNEL, PushModule, RemoteMessage};
pub use sdk::NativeSdk;
pub use tracking::{ConfigurableModule, TRACKING_CHANNEL, TrackingModule};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::sdk::{
        DataPipeline, InAppEventListener, InAppMessage, InAppMessaging, InboxChangeListener,
        InlineHostFactory, InlineMessageDelegate, InlineMessageHost, MetricEvent,
        NotificationInbox, PushMessaging, PushMetric,
    };
    pub use crate::{EngagePlugin, InboxMessage, NativeSdk, PluginOptions, RemoteMessage};
}
