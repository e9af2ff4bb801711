//! # parley-gateway
//!
//! REST API and WebSocket relay for real-time group chat.
//!
//! Clients create users and conversations, post and edit messages, and
//! react with emoji over HTTP; a persistent WebSocket per open
//! conversation view delivers live updates (new/edited/deleted messages,
//! reaction toggles, typing indicators, presence) to exactly the
//! connections joined to the affected room.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Connections (ws/)
//!     │
//!     ├── ChatService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── RoomRegistry (domain/)
//!     │
//!     └── SQLite Persistence (persistence/)
//! ```
//!
//! Mutations flow HTTP handler → `ChatService` → store → `EventBus`;
//! every WebSocket connection subscribes to the bus and filters events
//! down to its joined room. Delivery is best-effort: no retry, no
//! acknowledgment, no backlog for late joiners.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full application router (REST + WebSocket) over the given
/// state. Shared by `main` and the integration tests so both serve the
/// identical surface.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .with_state(state)
}
