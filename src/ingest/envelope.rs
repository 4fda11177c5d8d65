//! Wire types for the gateway event stream.
//!
//! The gateway delivers one JSON object per WebSocket text frame. Field
//! names are camelCase on the wire; every field below the top level is
//! optional and defaults are applied during normalization (see `filter`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound frame as received from the gateway.
///
/// Transient: exists only for the duration of one message handling cycle.
/// Frames without an `envelope` are not message events and are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnvelope {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub envelope: Option<Envelope>,
}

/// Message metadata wrapper inside a frame.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Unique per true message; used as the dedup key.
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub source_device: Option<u32>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub source_uuid: Option<String>,
    #[serde(default)]
    pub has_content: Option<bool>,
    #[serde(default)]
    pub is_unidentified_sender: Option<bool>,
    /// Present iff the event is the account's own outgoing message echoed back.
    #[serde(default)]
    pub sync_message: Option<Value>,
    #[serde(default)]
    pub data_message: Option<DataMessage>,
}

/// User-visible message content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<Value>>,
    #[serde(default)]
    pub reaction: Option<Vec<Value>>,
    #[serde(default)]
    pub group_info: Option<GroupInfo>,
}

/// Group context, present for group messages only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Direction of a message relative to the subscribed account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Incoming,
    Outgoing,
}

/// Normalized message event delivered to the sink.
///
/// Two events with equal `timestamp` are duplicates of the same message
/// regardless of content differences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub message_text: String,
    pub attachments: Vec<Value>,
    pub reactions: Vec<Value>,
    pub source_device: u32,
    pub source_name: String,
    pub source_uuid: String,
    pub group_internal_id: String,
    pub group_name: String,
    pub timestamp: u64,
    pub account: String,
    pub has_content: bool,
    pub is_unidentified_sender: bool,
    pub message_type: MessageType,
    /// Original envelope value, preserved for downstream use.
    pub raw_envelope: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_frame() {
        let frame = json!({
            "account": "+16135550123",
            "envelope": {
                "timestamp": 1000,
                "sourceDevice": 2,
                "sourceName": "Alice",
                "sourceUuid": "a1b2c3d4",
                "hasContent": true,
                "isUnidentifiedSender": false,
                "dataMessage": {
                    "message": "hi",
                    "attachments": [{"contentType": "image/png"}],
                    "reaction": [],
                    "groupInfo": {"groupId": "grp", "groupName": "Friends"}
                }
            }
        });

        let raw: RawEnvelope = serde_json::from_value(frame).unwrap();
        assert_eq!(raw.account.as_deref(), Some("+16135550123"));

        let envelope = raw.envelope.unwrap();
        assert_eq!(envelope.timestamp, Some(1000));
        assert_eq!(envelope.source_device, Some(2));
        assert_eq!(envelope.source_name.as_deref(), Some("Alice"));
        assert!(envelope.sync_message.is_none());

        let data = envelope.data_message.unwrap();
        assert_eq!(data.message.as_deref(), Some("hi"));
        assert_eq!(data.attachments.unwrap().len(), 1);

        let group = data.group_info.unwrap();
        assert_eq!(group.group_id.as_deref(), Some("grp"));
        assert_eq!(group.group_name.as_deref(), Some("Friends"));
    }

    #[test]
    fn test_deserialize_minimal_frame() {
        let raw: RawEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(raw.account.is_none());
        assert!(raw.envelope.is_none());
    }

    #[test]
    fn test_deserialize_tolerates_unknown_fields() {
        let frame = json!({
            "envelope": {"timestamp": 5, "serverTimestamp": 7, "extra": {"a": 1}},
            "subscription": 0
        });

        let raw: RawEnvelope = serde_json::from_value(frame).unwrap();
        assert_eq!(raw.envelope.unwrap().timestamp, Some(5));
    }

    #[test]
    fn test_message_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(MessageType::Incoming).unwrap(),
            json!("incoming")
        );
        assert_eq!(
            serde_json::to_value(MessageType::Outgoing).unwrap(),
            json!("outgoing")
        );
    }

    #[test]
    fn test_normalized_event_serializes_camel_case() {
        let event = NormalizedEvent {
            message_text: "hi".to_string(),
            attachments: vec![],
            reactions: vec![],
            source_device: 1,
            source_name: String::new(),
            source_uuid: String::new(),
            group_internal_id: String::new(),
            group_name: String::new(),
            timestamp: 1000,
            account: String::new(),
            has_content: true,
            is_unidentified_sender: false,
            message_type: MessageType::Incoming,
            raw_envelope: Value::Null,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["messageText"], json!("hi"));
        assert_eq!(value["sourceDevice"], json!(1));
        assert_eq!(value["messageType"], json!("incoming"));
        assert_eq!(value["rawEnvelope"], Value::Null);
    }
}
