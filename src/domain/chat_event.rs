//! Domain events relayed to WebSocket subscribers.
//!
//! Every successful mutation publishes a [`ChatEvent`] through the
//! [`super::EventBus`]; each connection filters the stream down to its
//! joined room. Delivery is best-effort: no retry, no acknowledgment, and
//! no backlog for late joiners.

use serde_json::json;

use super::entities::{Message, Reaction};
use super::ids::{ConversationId, MessageId, UserId};

/// Domain event scoped to one conversation room.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A message was posted.
    MessageNew {
        /// The hydrated message.
        message: Message,
    },

    /// A message's text was edited by its author.
    MessageUpdated {
        /// The hydrated message after the edit.
        message: Message,
    },

    /// A message was deleted by its author.
    MessageDeleted {
        /// Id of the deleted message.
        id: MessageId,
        /// Room the message belonged to.
        conversation_id: ConversationId,
    },

    /// A reaction toggle created a new reaction.
    ReactionAdded {
        /// The reaction that was created.
        reaction: Reaction,
        /// The message after the toggle.
        message: Message,
    },

    /// A reaction toggle removed an existing reaction.
    ReactionRemoved {
        /// User whose reaction was removed.
        user_id: UserId,
        /// Emoji of the removed reaction.
        emoji: String,
        /// The message after the toggle.
        message: Message,
    },

    /// A client signalled that a user is typing. Not persisted; relayed to
    /// room peers excluding connections registered to the typing user.
    Typing {
        /// User who is typing.
        user_id: UserId,
        /// Username to display.
        username: String,
        /// Room the signal applies to.
        conversation_id: ConversationId,
    },

    /// Best-effort presence update: the room's current online user ids.
    UsersOnline {
        /// Room the presence set applies to.
        conversation_id: ConversationId,
        /// Sorted, deduplicated ids of users with a live joined connection.
        user_ids: Vec<UserId>,
    },
}

impl ChatEvent {
    /// Returns the conversation (room) this event is scoped to.
    #[must_use]
    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            Self::MessageNew { message }
            | Self::MessageUpdated { message }
            | Self::ReactionAdded { message, .. }
            | Self::ReactionRemoved { message, .. } => &message.conversation_id,
            Self::MessageDeleted {
                conversation_id, ..
            }
            | Self::Typing {
                conversation_id, ..
            }
            | Self::UsersOnline {
                conversation_id, ..
            } => conversation_id,
        }
    }

    /// For [`ChatEvent::Typing`], the user id to exclude from delivery:
    /// the typist's own connections must not receive their own signal.
    #[must_use]
    pub fn excluded_user(&self) -> Option<&UserId> {
        match self {
            Self::Typing { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    /// Returns the wire `type` string of this event.
    #[must_use]
    pub const fn wire_type(&self) -> &'static str {
        match self {
            Self::MessageNew { .. } => "message:new",
            Self::MessageUpdated { .. } => "message:updated",
            Self::MessageDeleted { .. } => "message:deleted",
            Self::ReactionAdded { .. } => "reaction:added",
            Self::ReactionRemoved { .. } => "reaction:removed",
            Self::Typing { .. } => "typing",
            Self::UsersOnline { .. } => "users:online",
        }
    }

    /// Builds the wire `payload` value for this event.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::MessageNew { message } | Self::MessageUpdated { message } => {
                serde_json::to_value(message).unwrap_or_default()
            }
            Self::MessageDeleted {
                id,
                conversation_id,
            } => json!({
                "id": id,
                "conversationId": conversation_id,
            }),
            Self::ReactionAdded { reaction, message } => json!({
                "messageId": reaction.message_id,
                "reaction": reaction,
                "message": message,
            }),
            Self::ReactionRemoved {
                user_id,
                emoji,
                message,
            } => json!({
                "messageId": message.id,
                "userId": user_id,
                "emoji": emoji,
                "message": message,
            }),
            Self::Typing {
                user_id,
                username,
                conversation_id,
            } => json!({
                "userId": user_id,
                "username": username,
                "conversationId": conversation_id,
            }),
            Self::UsersOnline {
                conversation_id,
                user_ids,
            } => json!({
                "conversationId": conversation_id,
                "userIds": user_ids,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::ids::{MessageId, ReactionId};
    use chrono::Utc;

    fn make_message(room: &str) -> Message {
        let author = User {
            id: UserId::from("u1"),
            username: "alice".to_string(),
        };
        Message {
            id: MessageId::from("m1"),
            conversation_id: ConversationId::from(room),
            author_id: author.id.clone(),
            text: "hi".to_string(),
            created_at: Utc::now(),
            author,
            reactions: Vec::new(),
        }
    }

    #[test]
    fn wire_types_match_protocol() {
        let message = make_message("c1");
        let event = ChatEvent::MessageNew {
            message: message.clone(),
        };
        assert_eq!(event.wire_type(), "message:new");

        let event = ChatEvent::MessageDeleted {
            id: message.id,
            conversation_id: message.conversation_id,
        };
        assert_eq!(event.wire_type(), "message:deleted");
    }

    #[test]
    fn conversation_id_accessor_covers_all_variants() {
        let room = ConversationId::from("c9");
        let event = ChatEvent::Typing {
            user_id: UserId::from("u1"),
            username: "alice".to_string(),
            conversation_id: room.clone(),
        };
        assert_eq!(event.conversation_id(), &room);

        let event = ChatEvent::MessageNew {
            message: make_message("c9"),
        };
        assert_eq!(event.conversation_id(), &room);
    }

    #[test]
    fn only_typing_excludes_a_user() {
        let typing = ChatEvent::Typing {
            user_id: UserId::from("u1"),
            username: "alice".to_string(),
            conversation_id: ConversationId::from("c1"),
        };
        assert_eq!(typing.excluded_user(), Some(&UserId::from("u1")));

        let broadcast = ChatEvent::MessageNew {
            message: make_message("c1"),
        };
        assert!(broadcast.excluded_user().is_none());
    }

    #[test]
    fn deleted_payload_carries_id_and_room() {
        let event = ChatEvent::MessageDeleted {
            id: MessageId::from("m7"),
            conversation_id: ConversationId::from("c3"),
        };
        let payload = event.payload();
        assert_eq!(payload.get("id").and_then(|v| v.as_str()), Some("m7"));
        assert_eq!(
            payload.get("conversationId").and_then(|v| v.as_str()),
            Some("c3")
        );
    }

    #[test]
    fn reaction_removed_payload_carries_triple_and_message() {
        let message = make_message("c1");
        let event = ChatEvent::ReactionRemoved {
            user_id: UserId::from("u2"),
            emoji: "🔥".to_string(),
            message: message.clone(),
        };
        let payload = event.payload();
        assert_eq!(payload.get("userId").and_then(|v| v.as_str()), Some("u2"));
        assert_eq!(payload.get("emoji").and_then(|v| v.as_str()), Some("🔥"));
        assert_eq!(
            payload.pointer("/message/id").and_then(|v| v.as_str()),
            Some("m1")
        );
    }

    #[test]
    fn reaction_added_payload_embeds_reaction() {
        let message = make_message("c1");
        let event = ChatEvent::ReactionAdded {
            reaction: Reaction {
                id: ReactionId::from("r1"),
                message_id: message.id.clone(),
                user_id: UserId::from("u2"),
                emoji: "👍".to_string(),
            },
            message,
        };
        let payload = event.payload();
        assert_eq!(
            payload.get("messageId").and_then(|v| v.as_str()),
            Some("m1")
        );
        assert_eq!(
            payload.pointer("/reaction/emoji").and_then(|v| v.as_str()),
            Some("👍")
        );
    }
}
