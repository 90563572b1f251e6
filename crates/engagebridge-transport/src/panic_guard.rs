//! Panic containment for handler invocations
//!
//! Handlers run on the caller's UI thread; a panic there must become a
//! failure result instead of unwinding into the host.

use engagebridge_core::BridgeError;
use std::any::Any;
use std::panic;

/// Run `f`, converting a panic into [`BridgeError::Panicked`]
///
/// The panic is logged through tracing before it is returned.
pub fn catch_panic<F, R>(f: F) -> Result<R, BridgeError>
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    panic::catch_unwind(f).map_err(|panic_info| {
        let panic_msg = panic_to_string(&panic_info);
        tracing::error!("handler panic caught: {}", panic_msg);
        BridgeError::Panicked(panic_msg)
    })
}

/// Convert a panic payload to a human-readable string
pub(crate) fn panic_to_string(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Install a panic hook that reports panics through tracing
///
/// Replaces any existing hook for the whole process. Call once when the
/// plugin is registered with the host engine.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        let msg = match panic_info.location() {
            Some(location) => format!(
                "Panic at {}:{}:{}: {}",
                location.file(),
                location.line(),
                location.column(),
                payload
            ),
            None => format!("Panic at unknown location: {}", payload),
        };

        tracing::error!("PANIC: {}", msg);
    }));
}
