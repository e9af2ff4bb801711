//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, RoomRegistry};
use crate::service::ChatService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// The registry and bus are constructed once by the process entry point
/// and injected here — no ambient singletons — so tests assemble isolated
/// instances per case.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Chat service for all persistence-backed mutations.
    pub chat_service: Arc<ChatService>,
    /// Event bus the WebSocket connections subscribe to.
    pub event_bus: EventBus,
    /// Connection → room registry for join state and presence.
    pub registry: Arc<RoomRegistry>,
}
