//! Hydrated chat entities as served to clients.
//!
//! These are the JSON shapes shared by the REST responses and the relay
//! payloads: a [`Message`] always carries its author and current reactions
//! so subscribers can render it without a follow-up read. Field names
//! serialize camelCase to match the wire protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{ConversationId, MessageId, ReactionId, UserId};

/// A chat user. Created idempotently by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique generated id.
    pub id: UserId,
    /// Unique username chosen at creation.
    pub username: String,
}

/// A conversation (group chat room).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique generated id — the realtime "room" key.
    pub id: ConversationId,
    /// Display title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A single emoji reaction on a message.
///
/// At most one reaction exists per `(message_id, user_id, emoji)` triple
/// at any instant; repeating the triple toggles it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Unique generated id.
    pub id: ReactionId,
    /// Message this reaction belongs to.
    pub message_id: MessageId,
    /// User who reacted.
    pub user_id: UserId,
    /// Short emoji string.
    pub emoji: String,
}

/// A message, hydrated with its author and current reactions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique generated id.
    pub id: MessageId,
    /// Conversation the message was posted to.
    pub conversation_id: ConversationId,
    /// Author user id. Only the author may edit or delete the message.
    pub author_id: UserId,
    /// Message body.
    pub text: String,
    /// Creation timestamp; list ordering key.
    pub created_at: DateTime<Utc>,
    /// The author, embedded.
    pub author: User,
    /// All current reactions, in insertion order.
    pub reactions: Vec<Reaction>,
}
