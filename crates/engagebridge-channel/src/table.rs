//! Per-module dispatch tables keyed by method name

use crate::reply::PendingReply;
use engagebridge_core::{MethodCall, MethodResult};
use std::collections::HashMap;

/// Handler that answers before returning
pub type SyncHandler<M> = fn(&M, &MethodCall) -> MethodResult;

/// Handler that answers through the reply handle, possibly later
pub type DeferredHandler<M> = fn(&M, &MethodCall, PendingReply);

enum Route<M> {
    Sync(SyncHandler<M>),
    Deferred(DeferredHandler<M>),
}

/// Static `{method name -> handler}` table for a module of type `M`
///
/// Lookup is by exact method name. A call with no entry answers
/// not-implemented, which callers treat as distinct from a failure.
pub struct MethodTable<M> {
    routes: HashMap<&'static str, Route<M>>,
}

impl<M> MethodTable<M> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Add a synchronous handler
    pub fn sync(mut self, method: &'static str, handler: SyncHandler<M>) -> Self {
        self.routes.insert(method, Route::Sync(handler));
        self
    }

    /// Add a handler that answers through the reply handle
    pub fn deferred(mut self, method: &'static str, handler: DeferredHandler<M>) -> Self {
        self.routes.insert(method, Route::Deferred(handler));
        self
    }

    /// Check whether `method` is routed
    pub fn contains(&self, method: &str) -> bool {
        self.routes.contains_key(method)
    }

    /// Routed method names, sorted
    pub fn methods(&self) -> Vec<&'static str> {
        let mut methods: Vec<_> = self.routes.keys().copied().collect();
        methods.sort_unstable();
        methods
    }

    /// Route `call` to its handler on `module`
    pub fn dispatch(&self, module: &M, call: &MethodCall, reply: PendingReply) {
        match self.routes.get(call.method.as_str()) {
            Some(Route::Sync(handler)) => reply.send(handler(module, call)),
            Some(Route::Deferred(handler)) => handler(module, call, reply),
            None => {
                tracing::debug!(method = %call.method, "method not implemented");
                reply.not_implemented();
            }
        }
    }
}

impl<M> Default for MethodTable<M> {
    fn default() -> Self {
        Self::new()
    }
}
