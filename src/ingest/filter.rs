//! Content-based event filtering.
//!
//! `classify` is a pure function from one raw frame to either a normalized
//! event or a drop decision. It never fails: absent optional fields default
//! to empty/zero/false, and malformed top-level frames are rejected before
//! this point (see `supervisor`).

use std::fmt;

use serde_json::Value;

use super::envelope::{MessageType, NormalizedEvent, RawEnvelope};

/// Immutable content filter switches, fixed at startup.
///
/// The three ignore switches are independent: any single match drops the
/// event even if the other switches would pass it.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Drop events carrying message text
    pub ignore_messages: bool,
    /// Drop events carrying attachments
    pub ignore_attachments: bool,
    /// Drop events carrying reactions
    pub ignore_reactions: bool,
}

/// Why a frame was dropped instead of emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Frame has no `envelope`; not a message event
    NotMessageEvent,
    /// No text, no attachments, no reactions
    EmptyContent,
    /// `ignore_messages` matched non-empty text
    FilteredMessage,
    /// `ignore_attachments` matched non-empty attachments
    FilteredAttachment,
    /// `ignore_reactions` matched non-empty reactions
    FilteredReaction,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::NotMessageEvent => "not-a-message-event",
            DropReason::EmptyContent => "empty-content",
            DropReason::FilteredMessage => "filtered-message",
            DropReason::FilteredAttachment => "filtered-attachment",
            DropReason::FilteredReaction => "filtered-reaction",
        };
        write!(f, "{}", reason)
    }
}

/// Outcome of classifying one frame
#[derive(Debug)]
pub enum Decision {
    Emit(Box<NormalizedEvent>),
    Drop(DropReason),
}

/// Classify one raw frame against the filter switches.
///
/// `frame` is the frame's original JSON value; its `envelope` member is
/// preserved verbatim on the emitted event for downstream use.
pub fn classify(raw: &RawEnvelope, frame: &Value, opts: &FilterOptions) -> Decision {
    let Some(envelope) = &raw.envelope else {
        return Decision::Drop(DropReason::NotMessageEvent);
    };

    let data = envelope.data_message.clone().unwrap_or_default();
    let group = data.group_info.unwrap_or_default();

    let event = NormalizedEvent {
        message_text: data.message.unwrap_or_default(),
        attachments: data.attachments.unwrap_or_default(),
        reactions: data.reaction.unwrap_or_default(),
        source_device: envelope.source_device.unwrap_or(0),
        source_name: envelope.source_name.clone().unwrap_or_default(),
        source_uuid: envelope.source_uuid.clone().unwrap_or_default(),
        group_internal_id: group.group_id.unwrap_or_default(),
        group_name: group.group_name.unwrap_or_default(),
        timestamp: envelope.timestamp.unwrap_or(0),
        account: raw.account.clone().unwrap_or_default(),
        has_content: envelope.has_content.unwrap_or(false),
        is_unidentified_sender: envelope.is_unidentified_sender.unwrap_or(false),
        message_type: if envelope.sync_message.is_some() {
            MessageType::Outgoing
        } else {
            MessageType::Incoming
        },
        raw_envelope: frame.get("envelope").cloned().unwrap_or(Value::Null),
    };

    if event.message_text.is_empty() && event.attachments.is_empty() && event.reactions.is_empty() {
        return Decision::Drop(DropReason::EmptyContent);
    }

    if opts.ignore_messages && !event.message_text.is_empty() {
        return Decision::Drop(DropReason::FilteredMessage);
    }
    if opts.ignore_attachments && !event.attachments.is_empty() {
        return Decision::Drop(DropReason::FilteredAttachment);
    }
    if opts.ignore_reactions && !event.reactions.is_empty() {
        return Decision::Drop(DropReason::FilteredReaction);
    }

    Decision::Emit(Box::new(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_value(frame: serde_json::Value, opts: &FilterOptions) -> Decision {
        let raw: RawEnvelope = serde_json::from_value(frame.clone()).unwrap();
        classify(&raw, &frame, opts)
    }

    fn expect_emit(decision: Decision) -> NormalizedEvent {
        match decision {
            Decision::Emit(event) => *event,
            Decision::Drop(reason) => panic!("Expected Emit, got Drop({})", reason),
        }
    }

    fn expect_drop(decision: Decision) -> DropReason {
        match decision {
            Decision::Drop(reason) => reason,
            Decision::Emit(event) => panic!("Expected Drop, got Emit at ts {}", event.timestamp),
        }
    }

    #[test]
    fn test_text_message_emits_incoming() {
        let frame = json!({
            "envelope": {"timestamp": 1000, "dataMessage": {"message": "hi"}}
        });

        let event = expect_emit(classify_value(frame, &FilterOptions::default()));
        assert_eq!(event.message_text, "hi");
        assert_eq!(event.message_type, MessageType::Incoming);
        assert_eq!(event.timestamp, 1000);
        assert!(event.attachments.is_empty());
        assert!(event.reactions.is_empty());
    }

    #[test]
    fn test_sync_message_marker_means_outgoing() {
        let frame = json!({
            "envelope": {
                "timestamp": 2000,
                "syncMessage": {},
                "dataMessage": {"message": "me too"}
            }
        });

        let event = expect_emit(classify_value(frame, &FilterOptions::default()));
        assert_eq!(event.message_type, MessageType::Outgoing);
    }

    #[test]
    fn test_missing_envelope_is_not_a_message_event() {
        let reason = expect_drop(classify_value(
            json!({"account": "+1555"}),
            &FilterOptions::default(),
        ));
        assert_eq!(reason, DropReason::NotMessageEvent);
    }

    #[test]
    fn test_empty_content_drops_regardless_of_config() {
        let frame = json!({"envelope": {"timestamp": 1, "dataMessage": {}}});

        for opts in [
            FilterOptions::default(),
            FilterOptions {
                ignore_messages: true,
                ignore_attachments: true,
                ignore_reactions: true,
            },
        ] {
            let reason = expect_drop(classify_value(frame.clone(), &opts));
            assert_eq!(reason, DropReason::EmptyContent);
        }
    }

    #[test]
    fn test_envelope_without_data_message_drops_as_empty() {
        let reason = expect_drop(classify_value(
            json!({"envelope": {"timestamp": 9}}),
            &FilterOptions::default(),
        ));
        assert_eq!(reason, DropReason::EmptyContent);
    }

    #[test]
    fn test_ignore_messages_drops_text() {
        let frame = json!({
            "envelope": {"timestamp": 1, "dataMessage": {"message": "hi"}}
        });
        let opts = FilterOptions {
            ignore_messages: true,
            ..Default::default()
        };

        assert_eq!(
            expect_drop(classify_value(frame, &opts)),
            DropReason::FilteredMessage
        );
    }

    #[test]
    fn test_ignore_attachments_is_independent() {
        // Attachment-only frame: dropped by ignore_attachments alone even
        // though the message and reaction switches would pass it
        let frame = json!({
            "envelope": {
                "timestamp": 1,
                "dataMessage": {"attachments": [{"contentType": "image/png"}]}
            }
        });
        let opts = FilterOptions {
            ignore_attachments: true,
            ..Default::default()
        };

        assert_eq!(
            expect_drop(classify_value(frame, &opts)),
            DropReason::FilteredAttachment
        );
    }

    #[test]
    fn test_ignore_reactions_drops_reaction() {
        let frame = json!({
            "envelope": {
                "timestamp": 1,
                "dataMessage": {"reaction": [{"emoji": "👍"}]}
            }
        });
        let opts = FilterOptions {
            ignore_reactions: true,
            ..Default::default()
        };

        assert_eq!(
            expect_drop(classify_value(frame, &opts)),
            DropReason::FilteredReaction
        );
    }

    #[test]
    fn test_attachment_only_frame_passes_default_config() {
        let frame = json!({
            "envelope": {
                "timestamp": 3,
                "dataMessage": {"attachments": [{"id": "123"}]}
            }
        });

        let event = expect_emit(classify_value(frame, &FilterOptions::default()));
        assert!(event.message_text.is_empty());
        assert_eq!(event.attachments.len(), 1);
    }

    #[test]
    fn test_absent_fields_default() {
        let frame = json!({
            "envelope": {"timestamp": 7, "dataMessage": {"message": "x"}}
        });

        let event = expect_emit(classify_value(frame, &FilterOptions::default()));
        assert_eq!(event.source_device, 0);
        assert_eq!(event.source_name, "");
        assert_eq!(event.source_uuid, "");
        assert_eq!(event.group_internal_id, "");
        assert_eq!(event.group_name, "");
        assert_eq!(event.account, "");
        assert!(!event.has_content);
        assert!(!event.is_unidentified_sender);
    }

    #[test]
    fn test_group_fields_extracted() {
        let frame = json!({
            "envelope": {
                "timestamp": 7,
                "dataMessage": {
                    "message": "x",
                    "groupInfo": {"groupId": "abc=", "groupName": "Ops"}
                }
            }
        });

        let event = expect_emit(classify_value(frame, &FilterOptions::default()));
        assert_eq!(event.group_internal_id, "abc=");
        assert_eq!(event.group_name, "Ops");
    }

    #[test]
    fn test_raw_envelope_preserved_verbatim() {
        let frame = json!({
            "envelope": {
                "timestamp": 7,
                "serverTimestamp": 8,
                "dataMessage": {"message": "x"}
            }
        });

        let event = expect_emit(classify_value(frame.clone(), &FilterOptions::default()));
        assert_eq!(event.raw_envelope, frame["envelope"]);
        // Unknown fields survive on the preserved value
        assert_eq!(event.raw_envelope["serverTimestamp"], json!(8));
    }
}
