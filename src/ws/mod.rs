//! WebSocket layer: connection handling, wire frames, room filtering.
//!
//! The WebSocket endpoint at `/ws` is the realtime channel: clients send
//! join and typing directives, the server pushes room-scoped events.
//! Mutations themselves travel over HTTP; this layer only relays.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
