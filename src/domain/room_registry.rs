//! Connection → room registry for the realtime layer.
//!
//! [`RoomRegistry`] tracks, per open WebSocket connection, which
//! conversation room it has joined and (optionally) which user it
//! represents. Lifecycle is scoped to process uptime; nothing here is
//! persisted. The registry is the source of truth for presence queries;
//! event fan-out itself rides the [`super::EventBus`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::ids::{ConnectionId, ConversationId, UserId};

/// Room/user association of one registered connection.
///
/// A connection has at most one room at a time: joining a new room
/// replaces the previous association.
#[derive(Debug, Clone, Default)]
pub struct RoomMember {
    /// Joined room, if any. `None` while the connection is unjoined.
    pub conversation_id: Option<ConversationId>,
    /// User operating the connection, if it identified itself on join.
    pub user_id: Option<UserId>,
}

/// Central store of open connections and their room membership.
///
/// Owned by the process entry point and injected where needed — no ambient
/// singleton — so tests instantiate isolated registries. Registry
/// operations never fail in a way observable to the client.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    next_id: AtomicU64,
    connections: RwLock<HashMap<ConnectionId, RoomMember>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly accepted connection in the unjoined state and
    /// returns its id.
    pub async fn register(&self) -> ConnectionId {
        let id = ConnectionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.connections.write().await.insert(id, RoomMember::default());
        id
    }

    /// Joins a connection to a room, replacing any previous association.
    ///
    /// Returns the room the connection was in before, if any, so callers
    /// can refresh presence for the room that was left. Re-joining the
    /// same room is a harmless overwrite. The conversation id is accepted
    /// verbatim; unknown rooms are valid and simply have no history.
    pub async fn join(
        &self,
        connection: ConnectionId,
        conversation_id: ConversationId,
        user_id: Option<UserId>,
    ) -> Option<ConversationId> {
        let mut map = self.connections.write().await;
        let member = map.entry(connection).or_default();
        let previous = member.conversation_id.replace(conversation_id);
        if user_id.is_some() {
            member.user_id = user_id;
        }
        previous
    }

    /// Removes a connection, returning its final association.
    ///
    /// Invoked on disconnect; there is no client-visible leave directive.
    /// Unknown connections are a no-op.
    pub async fn leave(&self, connection: ConnectionId) -> Option<RoomMember> {
        self.connections.write().await.remove(&connection)
    }

    /// Returns the ids of all connections currently joined to the room.
    pub async fn members_of(&self, conversation_id: &ConversationId) -> Vec<ConnectionId> {
        let map = self.connections.read().await;
        map.iter()
            .filter(|(_, m)| m.conversation_id.as_ref() == Some(conversation_id))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns the sorted, deduplicated user ids online in the room.
    ///
    /// Connections that joined without identifying a user are counted as
    /// members but contribute nothing here.
    pub async fn online_users(&self, conversation_id: &ConversationId) -> Vec<UserId> {
        let map = self.connections.read().await;
        let mut users: Vec<UserId> = map
            .values()
            .filter(|m| m.conversation_id.as_ref() == Some(conversation_id))
            .filter_map(|m| m.user_id.clone())
            .collect();
        users.sort();
        users.dedup();
        users
    }

    /// Returns the number of registered connections (joined or not).
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connections are registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
