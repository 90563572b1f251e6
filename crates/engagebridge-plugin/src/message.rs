//! Inbox message records and their wire shape
//!
//! Messages cross the boundary as maps with camelCase keys and millisecond
//! epoch timestamps. Optional fields are omitted when absent. Decoding is
//! tolerant of mistyped optional values; only `queueId` and `sentAt` are
//! required.

use engagebridge_core::{Arguments, BridgeError, BridgeResult};
use engagebridge_transport::lenient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A message in the notification inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxMessage {
    pub queue_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::deserialize"
    )]
    pub delivery_id: Option<String>,
    /// Expiry as milliseconds since the epoch
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::deserialize"
    )]
    pub expiry: Option<i64>,
    /// Send time as milliseconds since the epoch
    pub sent_at: i64,
    #[serde(default, deserialize_with = "or_default")]
    pub topics: Vec<String>,
    #[serde(rename = "type", default, deserialize_with = "or_default")]
    pub message_type: String,
    #[serde(default, deserialize_with = "or_default")]
    pub opened: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::deserialize"
    )]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "or_default")]
    pub properties: Arguments,
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl InboxMessage {
    /// Create a message with the required fields set
    pub fn new(queue_id: impl Into<String>, sent_at: i64) -> Self {
        Self {
            queue_id: queue_id.into(),
            delivery_id: None,
            expiry: None,
            sent_at,
            topics: Vec::new(),
            message_type: String::new(),
            opened: false,
            priority: None,
            properties: Arguments::new(),
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Decode a message map received from the caller
    ///
    /// A missing, non-map or incomplete payload is reported as invalid
    /// arguments so callers can tell bad input apart from SDK failures.
    pub fn from_value(value: Option<&Value>) -> BridgeResult<Self> {
        let value = value
            .filter(|v| v.is_object())
            .ok_or_else(|| BridgeError::InvalidArguments("message must be a map".to_string()))?;

        let message = Self::deserialize(value)
            .map_err(|e| BridgeError::InvalidArguments(format!("invalid inbox message: {}", e)))?;

        if message.queue_id.trim().is_empty() {
            return Err(BridgeError::InvalidArguments(
                "inbox message has a blank queueId".to_string(),
            ));
        }
        Ok(message)
    }

    /// Encode as the map sent to the caller
    pub fn to_value(&self) -> BridgeResult<Value> {
        serde_json::to_value(self).map_err(Into::into)
    }

    /// Check whether the message carries `topic`, ignoring case
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t.eq_ignore_ascii_case(topic))
    }
}

/// Keep only messages carrying `topic`; `None` keeps everything
pub fn filter_by_topic(messages: Vec<InboxMessage>, topic: Option<&str>) -> Vec<InboxMessage> {
    match topic {
        Some(topic) => messages.into_iter().filter(|m| m.has_topic(topic)).collect(),
        None => messages,
    }
}

#[cfg(test)]
#[path = "message/message_tests.rs"]
mod message_tests;
