#![allow(non_snake_case)]

use super::*;
use serde_json::json;

#[test]
fn InboxMessage___to_value___omits_absent_optionals() {
    let message = InboxMessage::new("q-1", 1_700_000_000_000).with_topics(["promo"]);

    let value = message.to_value().unwrap();

    assert_eq!(
        value,
        json!({
            "queueId": "q-1",
            "sentAt": 1_700_000_000_000_i64,
            "topics": ["promo"],
            "type": "",
            "opened": false,
            "properties": {}
        })
    );
}

#[test]
fn InboxMessage___to_value___includes_present_optionals() {
    let mut message = InboxMessage::new("q-1", 10);
    message.delivery_id = Some("d-1".into());
    message.expiry = Some(20);
    message.priority = Some(3);

    let value = message.to_value().unwrap();

    assert_eq!(value["deliveryId"], "d-1");
    assert_eq!(value["expiry"], 20);
    assert_eq!(value["priority"], 3);
}

#[test]
fn InboxMessage___from_value___reads_full_map() {
    let value = json!({
        "queueId": "q-1",
        "deliveryId": "d-1",
        "expiry": 99,
        "sentAt": 10,
        "topics": ["a", "b"],
        "type": "card",
        "opened": true,
        "priority": 1,
        "properties": {"title": "Hi"}
    });

    let message = InboxMessage::from_value(Some(&value)).unwrap();

    assert_eq!(message.queue_id, "q-1");
    assert_eq!(message.delivery_id.as_deref(), Some("d-1"));
    assert_eq!(message.topics, vec!["a", "b"]);
    assert_eq!(message.message_type, "card");
    assert!(message.opened);
    assert_eq!(message.properties["title"], "Hi");
}

#[test]
fn InboxMessage___from_value___skips_mistyped_optionals() {
    let value = json!({
        "queueId": "q-1",
        "sentAt": 10,
        "deliveryId": 42,
        "topics": "promo",
        "opened": "yes",
        "priority": "high"
    });

    let message = InboxMessage::from_value(Some(&value)).unwrap();

    assert_eq!(message.delivery_id, None);
    assert!(message.topics.is_empty());
    assert!(!message.opened);
    assert_eq!(message.priority, None);
}

#[test]
fn InboxMessage___from_value___missing_payload_is_invalid_arguments() {
    let err = InboxMessage::from_value(None).unwrap_err();

    assert!(matches!(err, BridgeError::InvalidArguments(_)));
}

#[test]
fn InboxMessage___from_value___non_map_is_invalid_arguments() {
    let err = InboxMessage::from_value(Some(&json!("q-1"))).unwrap_err();

    assert!(matches!(err, BridgeError::InvalidArguments(_)));
}

#[test]
fn InboxMessage___from_value___missing_sent_at_is_invalid_arguments() {
    let err = InboxMessage::from_value(Some(&json!({"queueId": "q-1"}))).unwrap_err();

    assert!(matches!(err, BridgeError::InvalidArguments(_)));
}

#[test]
fn InboxMessage___from_value___blank_queue_id_is_invalid_arguments() {
    let err = InboxMessage::from_value(Some(&json!({"queueId": " ", "sentAt": 1}))).unwrap_err();

    assert!(matches!(err, BridgeError::InvalidArguments(_)));
}

#[test]
fn InboxMessage___has_topic___ignores_case() {
    let message = InboxMessage::new("q-1", 1).with_topics(["Promo"]);

    assert!(message.has_topic("promo"));
    assert!(message.has_topic("PROMO"));
    assert!(!message.has_topic("news"));
}

#[test]
fn filter_by_topic___none___keeps_order_and_all_messages() {
    let messages = vec![InboxMessage::new("a", 1), InboxMessage::new("b", 2)];

    let kept = filter_by_topic(messages.clone(), None);

    assert_eq!(kept, messages);
}

#[test]
fn filter_by_topic___topic___keeps_only_matches() {
    let messages = vec![
        InboxMessage::new("a", 1).with_topics(["promo"]),
        InboxMessage::new("b", 2).with_topics(["news"]),
        InboxMessage::new("c", 3).with_topics(["news", "PROMO"]),
    ];

    let kept = filter_by_topic(messages, Some("promo"));

    let ids: Vec<_> = kept.iter().map(|m| m.queue_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}
