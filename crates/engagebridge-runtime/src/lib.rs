//! engagebridge-runtime - UI-thread dispatch and Tokio runtime integration
//!
//! This crate provides:
//! - [`UiDispatcher`] with [`UiThread`], [`ImmediateDispatcher`] and
//!   [`ManualDispatcher`] implementations
//! - [`AsyncRuntime`] for asynchronous native operations
//! - Shutdown support with broadcast signals

mod dispatcher;
mod runtime;
mod shutdown;

pub use dispatcher::{
    ImmediateDispatcher, ManualDispatcher, SharedDispatcher, Task, UiDispatcher, UiThread,
};
pub use runtime::{AsyncRuntime, RuntimeConfig};
pub use shutdown::{ShutdownHandle, ShutdownSignal};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AsyncRuntime, ImmediateDispatcher, RuntimeConfig, SharedDispatcher, ShutdownHandle,
        ShutdownSignal, UiDispatcher, UiThread,
    };
}
