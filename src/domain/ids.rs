//! Opaque identifier newtypes for chat entities.
//!
//! All persisted entities are keyed by opaque string ids (UUID v4 text,
//! generated server-side). They are kept as strings rather than parsed
//! UUIDs because the realtime layer must accept arbitrary client-supplied
//! conversation ids verbatim: joining an unknown room is valid and simply
//! matches no persisted history.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random id (UUID v4 text).
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Identifier of a persisted [`super::entities::User`].
    UserId
}

string_id! {
    /// Identifier of a conversation — also the "room" key of the realtime
    /// layer. A connection's registered `ConversationId` decides which
    /// relay events it receives; the registry never checks that the id
    /// refers to a persisted conversation.
    ConversationId
}

string_id! {
    /// Identifier of a persisted [`super::entities::Message`].
    MessageId
}

string_id! {
    /// Identifier of a persisted [`super::entities::Reaction`].
    ReactionId
}

/// Process-local identifier of one open WebSocket connection.
///
/// Handed out by [`super::RoomRegistry::register`]; never serialized to
/// clients and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw counter value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn generate_yields_unique_ids() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_matches_inner_string() {
        let id = UserId::from("u1");
        assert_eq!(format!("{id}"), "u1");
        assert_eq!(id.as_str(), "u1");
    }

    #[test]
    fn serde_is_transparent() {
        let id = MessageId::from("m-42");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"m-42\"");

        let back: Option<MessageId> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(id));
    }

    #[test]
    fn arbitrary_client_strings_are_valid_room_keys() {
        // Rooms are opaque; "c1" is as good a key as a UUID.
        let room = ConversationId::from("c1");
        assert_eq!(room.as_str(), "c1");
    }

    #[test]
    fn connection_ids_hash_in_maps() {
        use std::collections::HashMap;
        let id = ConnectionId::from_raw(7);
        let mut map = HashMap::new();
        map.insert(id, "entry");
        assert_eq!(map.get(&id), Some(&"entry"));
    }
}
