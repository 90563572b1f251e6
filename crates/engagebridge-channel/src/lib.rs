//! engagebridge-channel - Method channels and module plumbing
//!
//! This crate provides the boundary between the host engine and the bridge:
//! - [`Messenger`] routing host calls to channel handlers and bridge events
//!   back to the host, always via the UI dispatcher
//! - [`MethodChannel`] for a single named channel
//! - [`PendingReply`] answering each call exactly once
//! - [`MethodTable`] static dispatch tables keyed by method name
//! - [`ModuleRegistry`] and [`NativeModule`] for attach/detach lifecycle
//! - [`PlatformViewRegistry`] for embedded native views

mod channel;
mod messenger;
mod platform_view;
mod registry;
mod reply;
mod table;

pub use channel::MethodChannel;
pub use messenger::{CallHandler, HostSink, Messenger};
pub use platform_view::{PlatformView, PlatformViewFactory, PlatformViewRegistry};
pub use registry::{ModuleRegistry, NativeModule};
pub use reply::{PendingReply, ReplyFn};
pub use table::{DeferredHandler, MethodTable, SyncHandler};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Messenger, MethodChannel, MethodTable, ModuleRegistry, NativeModule, PendingReply,
        PlatformView, PlatformViewFactory, PlatformViewRegistry,
    };
    pub use engagebridge_core::prelude::*;
    pub use engagebridge_runtime::prelude::*;
    pub use engagebridge_transport::prelude::*;
}
