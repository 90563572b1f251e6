//! # engagebridge
//!
//! Bridges a cross-platform UI host to a native engagement SDK over named
//! method channels.
//!
//! engagebridge hides the channel plumbing and provides:
//! - Tracking: identify, events, screens, attributes, device tokens, metrics
//! - Push: device token lookup and forwarding of remote messages
//! - In-app messaging: lifecycle events, dismissal and the notification inbox
//! - Inline in-app message views embedded in the host's layout
//! - Logging callbacks to the host
//!
//! ## Wiring a Host
//!
//! The host supplies a UI dispatcher, a sink for outbound events and an
//! adapter for each native SDK surface:
//!
//! ```ignore
//! use engagebridge::prelude::*;
//! use std::sync::Arc;
//!
//! let ui = Arc::new(UiThread::spawn("engage-ui")?);
//! let messenger = Messenger::new(ui);
//! messenger.set_host_sink(Some(Arc::new(|channel: &str, event: &MethodCall| {
//!     host_engine::send(channel, event);
//! })));
//!
//! let sdk = NativeSdk {
//!     data_pipeline: Arc::new(MyPipeline::default()),
//!     in_app: Arc::new(MyInApp::default()),
//!     push: Arc::new(MyPush::default()),
//!     inline_hosts: Arc::new(MyInlineHosts::default()),
//! };
//! let plugin = EngagePlugin::new(messenger, sdk, PluginOptions::new())?;
//! plugin.attach();
//!
//! // Inbound host calls
//! plugin.messenger().handle_encoded("customer_io", &bytes, Box::new(|reply| {
//!     host_engine::reply(reply);
//! }));
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`engagebridge_core`] - Call envelope, errors, configuration, state machines
//! - [`engagebridge_transport`] - JSON codec, lenient decoding, panic guard
//! - [`engagebridge_runtime`] - UI dispatchers and the Tokio runtime
//! - [`engagebridge_logging`] - Tracing layer forwarding records to the host
//! - [`engagebridge_channel`] - Messenger, method channels, module registry
//! - [`engagebridge_plugin`] - The tracking, push and in-app modules

pub use engagebridge_channel;
pub use engagebridge_core;
pub use engagebridge_logging;
pub use engagebridge_plugin;
pub use engagebridge_runtime;
pub use engagebridge_transport;

// Re-export core types
pub use engagebridge_core::{
    Arguments, BridgeError, BridgeResult, InlinePhase, LogLevel, MethodCall, MethodError,
    MethodResult, ModuleState, SdkConfig,
};

// Re-export channel types
pub use engagebridge_channel::{
    HostSink, Messenger, MethodChannel, ModuleRegistry, NativeModule, PendingReply,
};

// Re-export runtime types
pub use engagebridge_runtime::{
    AsyncRuntime, ImmediateDispatcher, RuntimeConfig, UiDispatcher, UiThread,
};

// Re-export the plugin
pub use engagebridge_plugin::{EngagePlugin, NativeSdk, PluginOptions, sdk};

// Re-export common dependencies that SDK adapters need
pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use engagebridge::prelude::*;` to import commonly used types.
///
/// This includes:
/// - Plugin root: `EngagePlugin`, `NativeSdk`, `PluginOptions`
/// - Native SDK traits implemented by the host adapter
/// - Channel plumbing: `Messenger`, `MethodCall`, `MethodResult`
/// - Dispatchers: `UiThread`, `ImmediateDispatcher`
/// - Common deps: `async_trait`, `Serialize`, `Deserialize`
pub mod prelude {
    pub use crate::{
        BridgeError, BridgeResult, EngagePlugin, ImmediateDispatcher, LogLevel, Messenger,
        MethodCall, MethodResult, NativeSdk, PluginOptions, RuntimeConfig, UiThread, async_trait,
    };

    pub use engagebridge_plugin::prelude::*;

    // Serde derives (commonly needed by SDK adapters)
    pub use serde::{Deserialize, Serialize};
}
