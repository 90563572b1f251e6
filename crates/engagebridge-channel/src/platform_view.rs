//! Platform view factories and live view tracking

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use engagebridge_core::{BridgeError, BridgeResult};
use serde_json::Value;
use std::sync::Arc;

/// A native view embedded in the host's widget tree
pub trait PlatformView: Send + Sync {
    /// Release observers and the native view
    ///
    /// Must be idempotent; the registry calls it once, but a view may also be
    /// torn down from its own channel.
    fn dispose(&self);
}

/// Builds platform views of one view type
pub trait PlatformViewFactory: Send + Sync {
    /// Create the view for `view_id` from the host's creation params
    fn create(&self, view_id: i64, creation_params: &Value) -> BridgeResult<Arc<dyn PlatformView>>;
}

/// Registered factories and the views they created
#[derive(Default)]
pub struct PlatformViewRegistry {
    factories: DashMap<String, Arc<dyn PlatformViewFactory>>,
    views: DashMap<i64, Arc<dyn PlatformView>>,
}

impl PlatformViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `view_type`
    pub fn register_factory(
        &self,
        view_type: &str,
        factory: Arc<dyn PlatformViewFactory>,
    ) -> BridgeResult<()> {
        match self.factories.entry(view_type.to_string()) {
            Entry::Occupied(_) => Err(BridgeError::ConfigError(format!(
                "view type '{}' is already registered",
                view_type
            ))),
            Entry::Vacant(slot) => {
                slot.insert(factory);
                Ok(())
            }
        }
    }

    /// Check whether a factory exists for `view_type`
    pub fn has_factory(&self, view_type: &str) -> bool {
        self.factories.contains_key(view_type)
    }

    /// Create a view and track it until disposed
    pub fn create_view(
        &self,
        view_type: &str,
        view_id: i64,
        creation_params: &Value,
    ) -> BridgeResult<Arc<dyn PlatformView>> {
        let factory = self
            .factories
            .get(view_type)
            .map(|f| f.value().clone())
            .ok_or_else(|| BridgeError::ConfigError(format!("unknown view type '{}'", view_type)))?;

        if self.views.contains_key(&view_id) {
            return Err(BridgeError::InvalidArguments(format!(
                "view {} already exists",
                view_id
            )));
        }

        let view = factory.create(view_id, creation_params)?;
        // A concurrent create for the same id loses; dispose its view.
        if let Some(previous) = self.views.insert(view_id, view.clone()) {
            tracing::warn!(view_id, "duplicate view id, disposing previous view");
            previous.dispose();
        }
        tracing::debug!(view_type, view_id, "platform view created");
        Ok(view)
    }

    /// Dispose and forget a view; no-op for unknown ids
    pub fn dispose_view(&self, view_id: i64) {
        if let Some((_, view)) = self.views.remove(&view_id) {
            view.dispose();
            tracing::debug!(view_id, "platform view disposed");
        }
    }

    /// Dispose every live view
    pub fn dispose_all(&self) {
        let ids: Vec<i64> = self.views.iter().map(|v| *v.key()).collect();
        for id in ids {
            self.dispose_view(id);
        }
    }

    /// Number of live views
    pub fn view_count(&self) -> usize {
        self.views.len()
    }
}
