//! WebSocket wire frames: inbound directives and outbound messages.
//!
//! Every frame is a JSON object with a `type` field. Inbound directives
//! carry their fields at the top level (`{"type":"join","conversationId":
//! "c1"}`); outbound frames wrap data in `payload`.
//!
//! Inbound parsing is deliberately two-phase: text that is not JSON at
//! all earns the sender an in-band error frame, while JSON that is merely
//! missing directive fields is ignored silently, leaving any prior room
//! membership unchanged.

use serde::Serialize;
use serde_json::json;

use crate::domain::ChatEvent;
use crate::domain::ids::{ConversationId, UserId};

/// Outbound server → client frame: `{"type": …, "payload": …}`.
#[derive(Debug, Clone, Serialize)]
pub struct ServerFrame {
    /// Frame type discriminator (e.g. `"message:new"`).
    #[serde(rename = "type")]
    pub frame_type: String,
    /// Frame payload.
    pub payload: serde_json::Value,
}

impl ServerFrame {
    /// The welcome acknowledgment sent immediately on accept.
    #[must_use]
    pub fn welcome() -> Self {
        Self {
            frame_type: "welcome".to_string(),
            payload: json!("connected"),
        }
    }

    /// The in-band error sent to a client whose frame was not JSON.
    #[must_use]
    pub fn invalid_json() -> Self {
        Self {
            frame_type: "error".to_string(),
            payload: json!("invalid json"),
        }
    }

    /// Builds the broadcast frame for a domain event.
    #[must_use]
    pub fn event(event: &ChatEvent) -> Self {
        Self {
            frame_type: event.wire_type().to_string(),
            payload: event.payload(),
        }
    }

    /// Serializes the frame to its wire string.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The join confirmation. Unlike event frames, it carries the room id at
/// the top level: `{"type":"joined","conversationId":"c1"}`.
#[must_use]
pub fn joined_frame(conversation_id: &ConversationId) -> String {
    serde_json::to_string(&json!({
        "type": "joined",
        "conversationId": conversation_id,
    }))
    .unwrap_or_default()
}

/// Parsed inbound client directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientDirective {
    /// Join a conversation room, replacing any previous room.
    Join {
        /// Room to join; accepted verbatim, existence is not checked.
        conversation_id: ConversationId,
        /// Optional identity of the user operating this connection.
        user_id: Option<UserId>,
    },
    /// Relay a typing signal to room peers.
    Typing {
        /// User who is typing.
        user_id: UserId,
        /// Username to display.
        username: String,
        /// Room the signal applies to.
        conversation_id: ConversationId,
    },
}

/// Outcome of parsing one inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A well-formed directive.
    Directive(ClientDirective),
    /// Valid JSON that is not a usable directive (unknown `type`, missing
    /// or wrong-typed fields). Silently ignored.
    Ignored,
    /// Not JSON at all; the sender gets an error frame.
    InvalidJson,
}

/// Parses one inbound text frame.
#[must_use]
pub fn parse_directive(text: &str) -> ParseOutcome {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return ParseOutcome::InvalidJson;
    };

    match value.get("type").and_then(|t| t.as_str()) {
        Some("join") => {
            let Some(conversation_id) = value.get("conversationId").and_then(|v| v.as_str())
            else {
                return ParseOutcome::Ignored;
            };
            let user_id = value
                .get("userId")
                .and_then(|v| v.as_str())
                .map(UserId::from);
            ParseOutcome::Directive(ClientDirective::Join {
                conversation_id: ConversationId::from(conversation_id),
                user_id,
            })
        }
        Some("typing") => {
            let (Some(user_id), Some(username), Some(conversation_id)) = (
                value.get("userId").and_then(|v| v.as_str()),
                value.get("username").and_then(|v| v.as_str()),
                value.get("conversationId").and_then(|v| v.as_str()),
            ) else {
                return ParseOutcome::Ignored;
            };
            ParseOutcome::Directive(ClientDirective::Typing {
                user_id: UserId::from(user_id),
                username: username.to_string(),
                conversation_id: ConversationId::from(conversation_id),
            })
        }
        _ => ParseOutcome::Ignored,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn welcome_frame_shape() {
        let json = ServerFrame::welcome().to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("welcome"));
        assert_eq!(
            value.get("payload").and_then(|v| v.as_str()),
            Some("connected")
        );
    }

    #[test]
    fn joined_frame_carries_room_at_top_level() {
        let json = joined_frame(&ConversationId::from("c1"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("joined"));
        assert_eq!(
            value.get("conversationId").and_then(|v| v.as_str()),
            Some("c1")
        );
    }

    #[test]
    fn parse_join_with_and_without_user() {
        let outcome = parse_directive(r#"{"type":"join","conversationId":"c1","userId":"u1"}"#);
        assert_eq!(
            outcome,
            ParseOutcome::Directive(ClientDirective::Join {
                conversation_id: ConversationId::from("c1"),
                user_id: Some(UserId::from("u1")),
            })
        );

        let outcome = parse_directive(r#"{"type":"join","conversationId":"c1"}"#);
        assert_eq!(
            outcome,
            ParseOutcome::Directive(ClientDirective::Join {
                conversation_id: ConversationId::from("c1"),
                user_id: None,
            })
        );
    }

    #[test]
    fn join_without_room_is_silently_ignored() {
        assert_eq!(parse_directive(r#"{"type":"join"}"#), ParseOutcome::Ignored);
        // Wrong-typed conversationId counts as missing.
        assert_eq!(
            parse_directive(r#"{"type":"join","conversationId":42}"#),
            ParseOutcome::Ignored
        );
    }

    #[test]
    fn parse_typing_requires_all_fields() {
        let outcome = parse_directive(
            r#"{"type":"typing","userId":"u1","username":"Alice","conversationId":"c1"}"#,
        );
        assert_eq!(
            outcome,
            ParseOutcome::Directive(ClientDirective::Typing {
                user_id: UserId::from("u1"),
                username: "Alice".to_string(),
                conversation_id: ConversationId::from("c1"),
            })
        );

        assert_eq!(
            parse_directive(r#"{"type":"typing","userId":"u1"}"#),
            ParseOutcome::Ignored
        );
    }

    #[test]
    fn unknown_type_is_ignored_but_garbage_is_an_error() {
        assert_eq!(
            parse_directive(r#"{"type":"dance"}"#),
            ParseOutcome::Ignored
        );
        assert_eq!(parse_directive(r#"{"no":"type"}"#), ParseOutcome::Ignored);
        assert_eq!(parse_directive("not json at all"), ParseOutcome::InvalidJson);
    }
}
