//! Push messaging module on `customer_io_messaging_push`

use crate::sdk::{DataPipeline, PushMessaging};
use engagebridge_channel::{MethodChannel, MethodTable, Messenger, NativeModule, PendingReply};
use engagebridge_core::{Arguments, ArgumentsExt, BridgeError, BridgeResult, MethodCall};
use engagebridge_transport::{invoke_no_args, invoke_typed, lenient};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PUSH_CHANNEL: &str = "customer_io_messaging_push";

/// A push payload in the shape the SDK consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    pub destination: String,
    pub message_id: Option<String>,
    pub message_type: Option<String>,
    pub collapse_key: Option<String>,
    pub ttl: Option<i64>,
    pub data: BTreeMap<String, String>,
}

impl RemoteMessage {
    /// Build a message from a caller payload
    ///
    /// `notification` fields are applied first and `data` fields overlaid, so
    /// `data` wins on conflicts. The destination is the non-blank `to` value,
    /// or a random UUID when absent.
    pub fn from_payload(payload: &Arguments) -> Self {
        let destination = payload
            .get_non_blank("to")
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut data = BTreeMap::new();
        for section in ["notification", "data"] {
            if let Some(fields) = payload.get_map(section) {
                for (key, value) in fields {
                    if let Some(text) = stringify(value) {
                        data.insert(key.clone(), text);
                    }
                }
            }
        }

        Self {
            destination,
            message_id: payload.get_as("messageId"),
            message_type: payload.get_as("messageType"),
            collapse_key: payload.get_as("collapseKey"),
            ttl: payload.get_as("ttl"),
            data,
        }
    }
}

// Scalars keep their textual form; nested values are sent as compact JSON.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => serde_json::to_string(nested).ok(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageReceivedArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    message: Option<Arguments>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    handle_notification_trigger: Option<bool>,
}

static METHODS: Lazy<MethodTable<PushModule>> = Lazy::new(|| {
    MethodTable::<PushModule>::new()
        .sync("getRegisteredDeviceToken", |module, call| {
            invoke_no_args(call, || module.pipeline.registered_device_token())
        })
        .sync("onMessageReceived", |module, call| {
            invoke_typed(call, |args: MessageReceivedArgs| module.on_message_received(args))
        })
});

/// Bridges push handling and device token lookup
pub struct PushModule {
    channel: MethodChannel,
    pipeline: Arc<dyn DataPipeline>,
    push: Arc<dyn PushMessaging>,
}

impl PushModule {
    pub fn new(
        messenger: Arc<Messenger>,
        pipeline: Arc<dyn DataPipeline>,
        push: Arc<dyn PushMessaging>,
    ) -> Self {
        Self {
            channel: MethodChannel::new(PUSH_CHANNEL, messenger),
            pipeline,
            push,
        }
    }

    fn on_message_received(&self, args: MessageReceivedArgs) -> BridgeResult<bool> {
        let payload = args
            .message
            .ok_or_else(|| BridgeError::MissingArgument("message".to_string()))?;
        let message = RemoteMessage::from_payload(&payload);

        self.push
            .on_message_received(&message, args.handle_notification_trigger.unwrap_or(true))
            .map_err(|err| {
                tracing::error!("unable to handle push notification: {:#}", err);
                BridgeError::from(err)
            })
    }
}

impl NativeModule for PushModule {
    fn module_name(&self) -> &'static str {
        "PushMessaging"
    }

    fn channel(&self) -> &MethodChannel {
        &self.channel
    }

    fn handle_call(&self, call: MethodCall, reply: PendingReply) {
        METHODS.dispatch(self, &call, reply);
    }
}
