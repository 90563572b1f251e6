//! In-app messaging module on `customer_io_messaging_in_app`

use crate::inbox::InboxBridge;
use crate::sdk::{InAppEventListener, InAppMessage, InAppMessaging};
use crate::tracking::ConfigurableModule;
use engagebridge_channel::{MethodChannel, MethodTable, Messenger, NativeModule, PendingReply};
use engagebridge_core::{Arguments, ArgumentsExt, MethodCall, SdkConfig};
use engagebridge_runtime::AsyncRuntime;
use engagebridge_transport::{decode_arguments, invoke_map_args, invoke_no_args, lenient};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const IN_APP_CHANNEL: &str = "customer_io_messaging_in_app";

/// Forwards global in-app message callbacks to the caller
struct InAppEventForwarder {
    channel: MethodChannel,
}

impl InAppEventForwarder {
    fn forward(&self, event: &str, message: &InAppMessage) {
        self.channel.invoke_method(
            event,
            json!({
                "messageId": message.message_id,
                "deliveryId": message.delivery_id,
            }),
        );
    }
}

impl InAppEventListener for InAppEventForwarder {
    fn message_shown(&self, message: &InAppMessage) {
        self.forward("messageShown", message);
    }

    fn message_dismissed(&self, message: &InAppMessage) {
        self.forward("messageDismissed", message);
    }

    fn error_with_message(&self, message: &InAppMessage) {
        self.forward("errorWithMessage", message);
    }

    fn message_action_taken(&self, message: &InAppMessage, action_value: &str, action_name: &str) {
        self.channel.invoke_method(
            "messageActionTaken",
            json!({
                "messageId": message.message_id,
                "deliveryId": message.delivery_id,
                "actionValue": action_value,
                "actionName": action_name,
            }),
        );
    }
}

#[derive(Debug, Deserialize)]
struct FetchArgs {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    topic: Option<String>,
}

fn message_arg(args: &Arguments) -> Option<&Value> {
    args.get("message")
}

static METHODS: Lazy<MethodTable<InAppModule>> = Lazy::new(|| {
    MethodTable::<InAppModule>::new()
        .sync("dismissMessage", |module, call| {
            invoke_no_args(call, || module.in_app.dismiss_message())
        })
        .sync("subscribeToInboxMessages", |module, call| {
            invoke_no_args(call, || module.inbox.subscribe())
        })
        .deferred("fetchInboxMessages", InAppModule::fetch_inbox_messages)
        .sync("markInboxMessageOpened", |module, call| {
            invoke_map_args(call, |args| module.inbox.mark_opened(message_arg(&args)))
        })
        .sync("markInboxMessageUnopened", |module, call| {
            invoke_map_args(call, |args| module.inbox.mark_unopened(message_arg(&args)))
        })
        .sync("markInboxMessageDeleted", |module, call| {
            invoke_map_args(call, |args| module.inbox.mark_deleted(message_arg(&args)))
        })
        .sync("trackInboxMessageClicked", |module, call| {
            invoke_map_args(call, |args| {
                module
                    .inbox
                    .track_clicked(message_arg(&args), args.get_str("actionName"))
            })
        })
});

/// Bridges in-app messages, their global events and the notification inbox
pub struct InAppModule {
    channel: MethodChannel,
    in_app: Arc<dyn InAppMessaging>,
    inbox: InboxBridge,
}

impl InAppModule {
    pub fn new(
        messenger: Arc<Messenger>,
        in_app: Arc<dyn InAppMessaging>,
        runtime: Arc<AsyncRuntime>,
    ) -> Self {
        let channel = MethodChannel::new(IN_APP_CHANNEL, messenger);
        let inbox = InboxBridge::new(in_app.clone(), channel.clone(), runtime);
        Self {
            channel,
            in_app,
            inbox,
        }
    }

    pub fn inbox(&self) -> &InboxBridge {
        &self.inbox
    }

    fn fetch_inbox_messages(&self, call: &MethodCall, reply: PendingReply) {
        match decode_arguments::<FetchArgs>(call.arguments()) {
            Ok(args) => {
                let topic = args.topic.filter(|t| !t.trim().is_empty());
                self.inbox.fetch(topic, reply);
            }
            Err(err) => reply.error(&err),
        }
    }
}

impl ConfigurableModule for InAppModule {
    fn configure(&self, config: &SdkConfig) {
        let Some(in_app) = &config.in_app else {
            tracing::debug!("in-app messaging not configured");
            return;
        };
        tracing::debug!(region = in_app.region.code(), "installing in-app event listener");
        self.in_app
            .set_event_listener(Some(Arc::new(InAppEventForwarder {
                channel: self.channel.clone(),
            })));
    }
}

impl NativeModule for InAppModule {
    fn module_name(&self) -> &'static str {
        "InAppMessaging"
    }

    fn channel(&self) -> &MethodChannel {
        &self.channel
    }

    fn handle_call(&self, call: MethodCall, reply: PendingReply) {
        METHODS.dispatch(self, &call, reply);
    }

    fn on_detached(&self) {
        self.inbox.unsubscribe();
    }
}
