//! Native modules and their attach/detach lifecycle

use crate::channel::MethodChannel;
use crate::messenger::CallHandler;
use crate::reply::PendingReply;
use engagebridge_core::{BridgeError, BridgeResult, MethodCall, ModuleState};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// A named unit of bridge functionality owning one channel
pub trait NativeModule: Send + Sync + 'static {
    /// Stable, session-unique module name
    fn module_name(&self) -> &'static str;

    /// Channel the module listens on
    fn channel(&self) -> &MethodChannel;

    /// Handle one call routed to this module
    fn handle_call(&self, call: MethodCall, reply: PendingReply);

    /// Called after the module is bound to its channel
    fn on_attached(&self) {}

    /// Called after the module is unbound from its channel
    fn on_detached(&self) {}
}

struct Entry {
    module: Arc<dyn NativeModule>,
    state: ModuleState,
}

/// Owns the plugin's modules and binds them to their channels
///
/// Attaching makes a module the sole handler of its channel; detaching
/// unbinds it. Both are idempotent.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module in the detached state
    ///
    /// Fails if a module with the same name is already registered.
    pub fn register(&self, module: Arc<dyn NativeModule>) -> BridgeResult<()> {
        let mut entries = self.entries.lock();
        let name = module.module_name();
        if entries.iter().any(|e| e.module.module_name() == name) {
            return Err(BridgeError::ConfigError(format!(
                "module '{}' is already registered",
                name
            )));
        }
        entries.push(Entry {
            module,
            state: ModuleState::Detached,
        });
        Ok(())
    }

    /// Registered module names in registration order
    pub fn module_names(&self) -> Vec<&'static str> {
        self.entries
            .lock()
            .iter()
            .map(|e| e.module.module_name())
            .collect()
    }

    /// Current state of the named module
    pub fn state(&self, name: &str) -> Option<ModuleState> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.module.module_name() == name)
            .map(|e| e.state)
    }

    /// Attach the named module; no-op if already attached
    pub fn attach(&self, name: &str) -> BridgeResult<()> {
        self.transition(name, ModuleState::Attached)
    }

    /// Detach the named module; no-op if already detached
    pub fn detach(&self, name: &str) -> BridgeResult<()> {
        self.transition(name, ModuleState::Detached)
    }

    /// Attach every module in registration order
    pub fn attach_all(&self) {
        for name in self.module_names() {
            if let Err(err) = self.attach(name) {
                tracing::warn!(module = name, "attach failed: {}", err);
            }
        }
    }

    /// Detach every module in reverse registration order
    pub fn detach_all(&self) {
        for name in self.module_names().into_iter().rev() {
            if let Err(err) = self.detach(name) {
                tracing::warn!(module = name, "detach failed: {}", err);
            }
        }
    }

    fn transition(&self, name: &str, target: ModuleState) -> BridgeResult<()> {
        let module = {
            let mut entries = self.entries.lock();
            let entry = entries
                .iter_mut()
                .find(|e| e.module.module_name() == name)
                .ok_or_else(|| BridgeError::ConfigError(format!("unknown module '{}'", name)))?;

            if !entry.state.is_transition(target) {
                return Ok(());
            }
            entry.state = target;

            let channel = entry.module.channel();
            match target {
                ModuleState::Attached => {
                    channel.set_method_call_handler(Some(module_handler(&entry.module)))
                }
                ModuleState::Detached => channel.set_method_call_handler(None),
            }
            tracing::debug!(
                module = name,
                channel = channel.name(),
                state = %target,
                "module state changed"
            );
            entry.module.clone()
        };

        // Hooks run outside the registry lock; they may call back into the plugin.
        match target {
            ModuleState::Attached => module.on_attached(),
            ModuleState::Detached => module.on_detached(),
        }
        Ok(())
    }
}

fn module_handler(module: &Arc<dyn NativeModule>) -> CallHandler {
    let weak: Weak<dyn NativeModule> = Arc::downgrade(module);
    Arc::new(move |call: MethodCall, reply: PendingReply| match weak.upgrade() {
        Some(module) => module.handle_call(call, reply),
        None => reply.not_implemented(),
    })
}
