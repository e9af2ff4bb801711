//! Domain layer: identifiers, entities, room registry, and event system.
//!
//! This module contains the server-side chat model: opaque entity ids,
//! hydrated entity views shared by REST and the relay, the event bus that
//! fans mutations out to WebSocket subscribers, and the room registry that
//! tracks which connection is in which conversation.

pub mod chat_event;
pub mod entities;
pub mod event_bus;
pub mod ids;
pub mod room_registry;

pub use chat_event::ChatEvent;
pub use entities::{Conversation, Message, Reaction, User};
pub use event_bus::EventBus;
pub use ids::{ConnectionId, ConversationId, MessageId, ReactionId, UserId};
pub use room_registry::{RoomMember, RoomRegistry};
