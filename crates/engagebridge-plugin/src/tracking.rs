//! Tracking module on `customer_io`
//!
//! Owns SDK initialization and the data pipeline calls: identification,
//! events, screens, attributes, device tokens and push metrics.

use crate::sdk::{DataPipeline, MetricEvent, PushMetric};
use engagebridge_channel::{MethodChannel, MethodTable, Messenger, NativeModule, PendingReply};
use engagebridge_core::{Arguments, BridgeError, BridgeResult, MethodCall, SdkConfig};
use engagebridge_transport::{invoke_map_args, invoke_no_args, invoke_typed, lenient};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

pub const TRACKING_CHANNEL: &str = "customer_io";

/// A module that takes part in SDK initialization
pub trait ConfigurableModule: Send + Sync {
    /// Apply the configuration decoded from `initialize`
    fn configure(&self, config: &SdkConfig);
}

fn required<T>(value: Option<T>, key: &str) -> BridgeResult<T> {
    value.ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
}

fn non_empty(map: Option<Arguments>) -> Option<Arguments> {
    map.filter(|m| !m.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    traits: Option<Arguments>,
}

#[derive(Debug, Deserialize)]
struct EventArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    properties: Option<Arguments>,
}

#[derive(Debug, Deserialize)]
struct AttributesArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    attributes: Option<Arguments>,
}

#[derive(Debug, Deserialize)]
struct TokenArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    delivery_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    delivery_token: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    metric_event: Option<String>,
}

static METHODS: Lazy<MethodTable<TrackingModule>> = Lazy::new(|| {
    MethodTable::<TrackingModule>::new()
        .sync("initialize", |module, call| {
            invoke_map_args(call, |args| module.initialize(&args))
        })
        .sync("identify", |module, call| {
            invoke_typed(call, |args: IdentifyArgs| module.identify(args))
        })
        .sync("clearIdentify", |module, call| {
            invoke_no_args(call, || module.pipeline.clear_identify())
        })
        .sync("track", |module, call| {
            invoke_typed(call, |args: EventArgs| module.track(args))
        })
        .sync("screen", |module, call| {
            invoke_typed(call, |args: EventArgs| module.screen(args))
        })
        .sync("setProfileAttributes", |module, call| {
            invoke_typed(call, |args: AttributesArgs| {
                module.set_attributes("profile", args, |a| {
                    module.pipeline.set_profile_attributes(a)
                })
            })
        })
        .sync("setDeviceAttributes", |module, call| {
            invoke_typed(call, |args: AttributesArgs| {
                module.set_attributes("device", args, |a| {
                    module.pipeline.set_device_attributes(a)
                })
            })
        })
        .sync("registerDeviceToken", |module, call| {
            invoke_typed(call, |args: TokenArgs| module.register_device_token(args))
        })
        .sync("trackMetric", |module, call| {
            invoke_typed(call, |args: MetricArgs| module.track_metric(args))
        })
});

/// Bridges the SDK's data pipeline
pub struct TrackingModule {
    channel: MethodChannel,
    pipeline: Arc<dyn DataPipeline>,
    configurables: Vec<Arc<dyn ConfigurableModule>>,
}

impl TrackingModule {
    /// Create the module; `configurables` are configured after the SDK initializes
    pub fn new(
        messenger: Arc<Messenger>,
        pipeline: Arc<dyn DataPipeline>,
        configurables: Vec<Arc<dyn ConfigurableModule>>,
    ) -> Self {
        Self {
            channel: MethodChannel::new(TRACKING_CHANNEL, messenger),
            pipeline,
            configurables,
        }
    }

    fn initialize(&self, args: &Arguments) -> BridgeResult<()> {
        let config = SdkConfig::from_args(args)?;

        if let Some(level) = config.log_level {
            engagebridge_logging::set_log_level(level.as_log_level());
        }

        self.pipeline.initialize(&config).map_err(|err| {
            tracing::error!("failed to initialize SDK: {:#}", err);
            BridgeError::from(err)
        })?;

        for module in &self.configurables {
            module.configure(&config);
        }
        tracing::info!(
            region = config.effective_region().code(),
            "SDK initialized from app"
        );
        Ok(())
    }

    fn identify(&self, args: IdentifyArgs) -> BridgeResult<()> {
        let traits = non_empty(args.traits);
        match (args.user_id, traits) {
            (Some(user_id), traits) => self.pipeline.identify(&user_id, traits.as_ref())?,
            (None, Some(traits)) => self.pipeline.set_profile_attributes(&traits)?,
            (None, None) => tracing::error!("identify needs a user ID or traits"),
        }
        Ok(())
    }

    fn track(&self, args: EventArgs) -> BridgeResult<()> {
        let name = required(args.name, "name")?;
        let properties = non_empty(args.properties);
        self.pipeline.track(&name, properties.as_ref())?;
        Ok(())
    }

    fn screen(&self, args: EventArgs) -> BridgeResult<()> {
        let title = required(args.title, "title")?;
        let properties = non_empty(args.properties);
        self.pipeline.screen(&title, properties.as_ref())?;
        Ok(())
    }

    fn set_attributes<F>(&self, kind: &str, args: AttributesArgs, apply: F) -> BridgeResult<()>
    where
        F: FnOnce(&Arguments) -> anyhow::Result<()>,
    {
        match non_empty(args.attributes) {
            Some(attributes) => apply(&attributes)?,
            None => tracing::error!(kind, "attributes are missing"),
        }
        Ok(())
    }

    fn register_device_token(&self, args: TokenArgs) -> BridgeResult<()> {
        let token = required(args.token, "token")?;
        self.pipeline.register_device_token(&token)?;
        Ok(())
    }

    fn track_metric(&self, args: MetricArgs) -> BridgeResult<()> {
        let delivery_id = required(args.delivery_id, "deliveryId")?;
        let device_token = required(args.delivery_token, "deliveryToken")?;
        let raw_event = required(args.metric_event, "metricEvent")?;
        let event =
            MetricEvent::parse(&raw_event).ok_or_else(|| BridgeError::UnsupportedValue {
                key: "metricEvent".to_string(),
                value: raw_event.clone(),
            })?;

        self.pipeline.track_metric(&PushMetric {
            delivery_id,
            device_token,
            event,
        })?;
        Ok(())
    }
}

impl NativeModule for TrackingModule {
    fn module_name(&self) -> &'static str {
        "Tracking"
    }

    fn channel(&self) -> &MethodChannel {
        &self.channel
    }

    fn handle_call(&self, call: MethodCall, reply: PendingReply) {
        METHODS.dispatch(self, &call, reply);
    }
}
