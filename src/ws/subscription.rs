//! Per-connection room filter.
//!
//! Each WebSocket connection receives the full event stream from the
//! [`crate::domain::EventBus`] and filters it down to its joined room.
//! A connection with no room matches nothing.

use crate::domain::ChatEvent;
use crate::domain::ids::{ConversationId, UserId};

/// Room/user view of a single WebSocket connection, used for server-side
/// event filtering.
///
/// Mirrors the registry entry for this connection but is owned by the
/// connection task itself, so the hot filter path takes no lock.
#[derive(Debug, Default)]
pub struct RoomSubscription {
    room: Option<ConversationId>,
    user: Option<UserId>,
}

impl RoomSubscription {
    /// Creates an unjoined subscription.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins a room, replacing any previous one. A `None` user keeps a
    /// previously recorded identity.
    pub fn join(&mut self, room: ConversationId, user: Option<UserId>) {
        self.room = Some(room);
        if user.is_some() {
            self.user = user;
        }
    }

    /// Returns the joined room, if any.
    #[must_use]
    pub fn room(&self) -> Option<&ConversationId> {
        self.room.as_ref()
    }

    /// Returns the recorded user identity, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Returns `true` if the event should be delivered to this connection.
    ///
    /// An event matches when its room equals the joined room, except that
    /// a typing signal is never delivered back to connections registered
    /// to the typing user.
    #[must_use]
    pub fn matches(&self, event: &ChatEvent) -> bool {
        let Some(room) = &self.room else {
            return false;
        };
        if event.conversation_id() != room {
            return false;
        }
        match (event.excluded_user(), &self.user) {
            (Some(excluded), Some(user)) => excluded != user,
            _ => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::entities::{Message, User};
    use crate::domain::ids::MessageId;
    use chrono::Utc;

    fn message_new(room: &str) -> ChatEvent {
        let author = User {
            id: UserId::from("u1"),
            username: "alice".to_string(),
        };
        ChatEvent::MessageNew {
            message: Message {
                id: MessageId::from("m1"),
                conversation_id: ConversationId::from(room),
                author_id: author.id.clone(),
                text: "hi".to_string(),
                created_at: Utc::now(),
                author,
                reactions: Vec::new(),
            },
        }
    }

    fn typing(room: &str, user: &str) -> ChatEvent {
        ChatEvent::Typing {
            user_id: UserId::from(user),
            username: "Alice".to_string(),
            conversation_id: ConversationId::from(room),
        }
    }

    #[test]
    fn unjoined_connection_matches_nothing() {
        let subs = RoomSubscription::new();
        assert!(!subs.matches(&message_new("c1")));
        assert!(!subs.matches(&typing("c1", "u1")));
    }

    #[test]
    fn joined_room_matches_only_its_events() {
        let mut subs = RoomSubscription::new();
        subs.join(ConversationId::from("c1"), None);
        assert!(subs.matches(&message_new("c1")));
        assert!(!subs.matches(&message_new("c2")));
    }

    #[test]
    fn joining_a_new_room_replaces_the_old() {
        let mut subs = RoomSubscription::new();
        subs.join(ConversationId::from("c1"), None);
        subs.join(ConversationId::from("c2"), None);
        assert!(!subs.matches(&message_new("c1")));
        assert!(subs.matches(&message_new("c2")));
    }

    #[test]
    fn typing_is_excluded_for_the_typist_only() {
        let mut same_user = RoomSubscription::new();
        same_user.join(ConversationId::from("c1"), Some(UserId::from("u1")));
        let mut other_user = RoomSubscription::new();
        other_user.join(ConversationId::from("c1"), Some(UserId::from("u2")));

        let event = typing("c1", "u1");
        assert!(!same_user.matches(&event));
        assert!(other_user.matches(&event));

        // Non-typing events reach the typist's connections normally.
        assert!(same_user.matches(&message_new("c1")));
    }

    #[test]
    fn anonymous_connection_still_receives_typing() {
        let mut subs = RoomSubscription::new();
        subs.join(ConversationId::from("c1"), None);
        assert!(subs.matches(&typing("c1", "u1")));
    }

    #[test]
    fn user_identity_survives_room_switch() {
        let mut subs = RoomSubscription::new();
        subs.join(ConversationId::from("c1"), Some(UserId::from("u1")));
        subs.join(ConversationId::from("c2"), None);
        assert!(!subs.matches(&typing("c2", "u1")));
    }
}
