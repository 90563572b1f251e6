//! Plugin root: builds the modules and owns their lifecycle

use crate::in_app::InAppModule;
use crate::inline::{INLINE_VIEW_TYPE, InlineViewFactory};
use crate::push::PushModule;
use crate::sdk::NativeSdk;
use crate::tracking::{ConfigurableModule, TrackingModule};
use engagebridge_channel::{Messenger, ModuleRegistry, PlatformViewRegistry};
use engagebridge_core::{BridgeResult, LogLevel};
use engagebridge_logging::{LogSink, LogSinkManager};
use engagebridge_runtime::{AsyncRuntime, RuntimeConfig};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Options applied when the plugin is created
#[derive(Clone)]
pub struct PluginOptions {
    /// Initial bridge log level; `initialize` may change it later
    pub log_level: LogLevel,
    /// Host function receiving bridge log records
    pub log_sink: Option<LogSink>,
    pub runtime: RuntimeConfig,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_sink: None,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }
}

impl fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginOptions")
            .field("log_level", &self.log_level)
            .field("log_sink", &self.log_sink.is_some())
            .field("runtime", &self.runtime)
            .finish()
    }
}

/// The engagement SDK plugin
///
/// Owns the tracking, push and in-app modules, the inline view factory and
/// the runtime used for asynchronous inbox reads. Modules are registered
/// detached; [`EngagePlugin::attach`] binds them to their channels.
pub struct EngagePlugin {
    messenger: Arc<Messenger>,
    registry: ModuleRegistry,
    views: PlatformViewRegistry,
    runtime: Arc<AsyncRuntime>,
    in_app: Arc<InAppModule>,
}

impl EngagePlugin {
    /// Build the plugin on `messenger` backed by `sdk`
    pub fn new(
        messenger: Arc<Messenger>,
        sdk: NativeSdk,
        options: PluginOptions,
    ) -> BridgeResult<Self> {
        if let Some(sink) = options.log_sink {
            LogSinkManager::global().set_sink(Some(sink));
        }
        if !engagebridge_logging::init_logging(options.log_level) {
            engagebridge_logging::set_log_level(options.log_level);
        }
        engagebridge_transport::install_panic_hook();

        let runtime = Arc::new(AsyncRuntime::new(options.runtime)?);

        let in_app = Arc::new(InAppModule::new(
            messenger.clone(),
            sdk.in_app.clone(),
            runtime.clone(),
        ));
        let push = Arc::new(PushModule::new(
            messenger.clone(),
            sdk.data_pipeline.clone(),
            sdk.push.clone(),
        ));
        let configurables = vec![in_app.clone() as Arc<dyn ConfigurableModule>];
        let tracking = Arc::new(TrackingModule::new(
            messenger.clone(),
            sdk.data_pipeline.clone(),
            configurables,
        ));

        let registry = ModuleRegistry::new();
        registry.register(tracking)?;
        registry.register(push)?;
        registry.register(in_app.clone())?;

        let views = PlatformViewRegistry::new();
        views.register_factory(
            INLINE_VIEW_TYPE,
            Arc::new(InlineViewFactory::new(messenger.clone(), sdk.inline_hosts)),
        )?;

        Ok(Self {
            messenger,
            registry,
            views,
            runtime,
            in_app,
        })
    }

    pub fn messenger(&self) -> &Arc<Messenger> {
        &self.messenger
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn views(&self) -> &PlatformViewRegistry {
        &self.views
    }

    pub fn in_app(&self) -> &InAppModule {
        &self.in_app
    }

    /// Bind every module to its channel
    pub fn attach(&self) {
        self.registry.attach_all();
        tracing::info!(modules = ?self.registry.module_names(), "plugin attached");
    }

    /// Dispose live views and unbind every module
    ///
    /// Detaching the in-app module also removes the inbox listener.
    pub fn detach(&self) {
        self.views.dispose_all();
        self.registry.detach_all();
        tracing::info!("plugin detached");
    }

    /// Create an embedded view of `view_type`
    pub fn create_view(
        &self,
        view_type: &str,
        view_id: i64,
        creation_params: &Value,
    ) -> BridgeResult<()> {
        self.views.create_view(view_type, view_id, creation_params)?;
        Ok(())
    }

    pub fn dispose_view(&self, view_id: i64) {
        self.views.dispose_view(view_id);
    }

    /// Detach and stop the runtime, failing in-flight inbox fetches
    pub fn shutdown(&self, timeout: Duration) {
        self.detach();
        self.runtime.shutdown(timeout);
    }
}

impl fmt::Debug for EngagePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngagePlugin")
            .field("modules", &self.registry.module_names())
            .field("views", &self.views.view_count())
            .finish()
    }
}
