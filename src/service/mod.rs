//! Service layer: business logic orchestration.
//!
//! [`ChatService`] coordinates chat mutations: it persists through the
//! [`crate::persistence::ChatStore`] and, on success, publishes the
//! resulting event through the [`crate::domain::EventBus`].

pub mod chat_service;

pub use chat_service::ChatService;
