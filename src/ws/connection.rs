//! WebSocket connection state machine.
//!
//! Runs the read/write loop for a single connection: inbound directives
//! (join, typing) mutate the connection's room state and the shared
//! registry; events from the bus are filtered by room and forwarded.
//!
//! Lifecycle: `Connected-Unjoined` on accept (welcome sent immediately),
//! `Joined` after a join directive (re-joinable, replacing the room),
//! `Closed` when either endpoint closes — the registry entry is removed
//! and room presence refreshed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{ClientDirective, ParseOutcome, ServerFrame, joined_frame, parse_directive};
use super::subscription::RoomSubscription;
use crate::domain::ids::{ConnectionId, ConversationId};
use crate::domain::{ChatEvent, EventBus, RoomRegistry};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads directives from the client and applies them.
/// - Forwards room-matching events from the [`broadcast::Receiver`].
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<ChatEvent>,
    registry: Arc<RoomRegistry>,
    event_bus: EventBus,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let connection_id = registry.register().await;
    let mut subs = RoomSubscription::new();

    if ws_tx
        .send(Message::text(ServerFrame::welcome().to_json()))
        .await
        .is_err()
    {
        finish(connection_id, &registry, &event_bus).await;
        return;
    }

    loop {
        tokio::select! {
            // Incoming directive from the client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply =
                            handle_text_frame(&text, connection_id, &mut subs, &registry, &event_bus)
                                .await;
                        if let Some(reply_json) = reply
                            && ws_tx.send(Message::text(reply_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            // Event from the bus
            event = event_rx.recv() => {
                match event {
                    Ok(chat_event) => {
                        if subs.matches(&chat_event) {
                            let json = ServerFrame::event(&chat_event).to_json();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%connection_id, lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    finish(connection_id, &registry, &event_bus).await;
    tracing::debug!(%connection_id, "ws connection closed");
}

/// Handles one inbound text frame, returning an optional JSON reply for
/// the sender. Only malformed JSON and successful joins produce replies;
/// everything else is silent.
async fn handle_text_frame(
    text: &str,
    connection_id: ConnectionId,
    subs: &mut RoomSubscription,
    registry: &Arc<RoomRegistry>,
    event_bus: &EventBus,
) -> Option<String> {
    match parse_directive(text) {
        ParseOutcome::InvalidJson => Some(ServerFrame::invalid_json().to_json()),
        ParseOutcome::Ignored => None,
        ParseOutcome::Directive(ClientDirective::Join {
            conversation_id,
            user_id,
        }) => {
            subs.join(conversation_id.clone(), user_id.clone());
            let previous = registry
                .join(connection_id, conversation_id.clone(), user_id)
                .await;

            // Presence refresh for the room that was left, then the one
            // that was joined.
            if let Some(old_room) = previous
                && old_room != conversation_id
            {
                publish_presence(registry, event_bus, &old_room).await;
            }
            publish_presence(registry, event_bus, &conversation_id).await;

            tracing::debug!(%connection_id, room = %conversation_id, "connection joined room");
            Some(joined_frame(&conversation_id))
        }
        ParseOutcome::Directive(ClientDirective::Typing {
            user_id,
            username,
            conversation_id,
        }) => {
            let _ = event_bus.publish(ChatEvent::Typing {
                user_id,
                username,
                conversation_id,
            });
            None
        }
    }
}

/// Removes the connection from the registry and refreshes presence for
/// the room it occupied, if any.
async fn finish(connection_id: ConnectionId, registry: &Arc<RoomRegistry>, event_bus: &EventBus) {
    let member = registry.leave(connection_id).await;
    if let Some(room) = member.and_then(|m| m.conversation_id) {
        publish_presence(registry, event_bus, &room).await;
    }
}

async fn publish_presence(
    registry: &Arc<RoomRegistry>,
    event_bus: &EventBus,
    conversation_id: &ConversationId,
) {
    let user_ids = registry.online_users(conversation_id).await;
    let _ = event_bus.publish(ChatEvent::UsersOnline {
        conversation_id: conversation_id.clone(),
        user_ids,
    });
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ids::UserId;

    fn setup() -> (Arc<RoomRegistry>, EventBus) {
        (Arc::new(RoomRegistry::new()), EventBus::new(16))
    }

    #[tokio::test]
    async fn join_directive_registers_and_confirms() {
        let (registry, bus) = setup();
        let conn = registry.register().await;
        let mut subs = RoomSubscription::new();

        let reply = handle_text_frame(
            r#"{"type":"join","conversationId":"c1","userId":"u1"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;

        let Some(reply) = reply else {
            panic!("join should confirm");
        };
        assert!(reply.contains("\"joined\""));
        assert!(reply.contains("c1"));
        assert_eq!(
            registry.members_of(&ConversationId::from("c1")).await,
            vec![conn]
        );
        assert_eq!(subs.room(), Some(&ConversationId::from("c1")));
    }

    #[tokio::test]
    async fn join_publishes_presence_for_old_and_new_room() {
        let (registry, bus) = setup();
        let conn = registry.register().await;
        let mut subs = RoomSubscription::new();
        let mut rx = bus.subscribe();

        handle_text_frame(
            r#"{"type":"join","conversationId":"c1","userId":"u1"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;
        let Ok(ChatEvent::UsersOnline { conversation_id, user_ids }) = rx.recv().await else {
            panic!("expected presence for c1");
        };
        assert_eq!(conversation_id, ConversationId::from("c1"));
        assert_eq!(user_ids, vec![UserId::from("u1")]);

        // Switching rooms refreshes the vacated room first.
        handle_text_frame(
            r#"{"type":"join","conversationId":"c2"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;
        let Ok(ChatEvent::UsersOnline { conversation_id, user_ids }) = rx.recv().await else {
            panic!("expected presence for vacated c1");
        };
        assert_eq!(conversation_id, ConversationId::from("c1"));
        assert!(user_ids.is_empty());

        let Ok(ChatEvent::UsersOnline { conversation_id, user_ids }) = rx.recv().await else {
            panic!("expected presence for c2");
        };
        assert_eq!(conversation_id, ConversationId::from("c2"));
        assert_eq!(user_ids, vec![UserId::from("u1")]);
    }

    #[tokio::test]
    async fn malformed_json_replies_error_and_keeps_room() {
        let (registry, bus) = setup();
        let conn = registry.register().await;
        let mut subs = RoomSubscription::new();

        handle_text_frame(
            r#"{"type":"join","conversationId":"c1"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;

        let reply = handle_text_frame("{{nope", conn, &mut subs, &registry, &bus).await;
        let Some(reply) = reply else {
            panic!("garbage should earn an error frame");
        };
        assert!(reply.contains("invalid json"));
        // Prior membership is untouched.
        assert_eq!(subs.room(), Some(&ConversationId::from("c1")));
    }

    #[tokio::test]
    async fn join_without_room_is_silent_and_keeps_membership() {
        let (registry, bus) = setup();
        let conn = registry.register().await;
        let mut subs = RoomSubscription::new();

        handle_text_frame(
            r#"{"type":"join","conversationId":"c1"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;
        let reply = handle_text_frame(r#"{"type":"join"}"#, conn, &mut subs, &registry, &bus).await;

        assert!(reply.is_none());
        assert_eq!(subs.room(), Some(&ConversationId::from("c1")));
        assert_eq!(
            registry.members_of(&ConversationId::from("c1")).await,
            vec![conn]
        );
    }

    #[tokio::test]
    async fn typing_directive_publishes_to_the_bus() {
        let (registry, bus) = setup();
        let conn = registry.register().await;
        let mut subs = RoomSubscription::new();
        let mut rx = bus.subscribe();

        let reply = handle_text_frame(
            r#"{"type":"typing","userId":"u1","username":"Alice","conversationId":"c1"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;
        assert!(reply.is_none());

        let Ok(ChatEvent::Typing { user_id, username, conversation_id }) = rx.recv().await else {
            panic!("expected typing event");
        };
        assert_eq!(user_id, UserId::from("u1"));
        assert_eq!(username, "Alice");
        assert_eq!(conversation_id, ConversationId::from("c1"));
    }

    #[tokio::test]
    async fn finish_clears_registry_and_refreshes_presence() {
        let (registry, bus) = setup();
        let conn = registry.register().await;
        let mut subs = RoomSubscription::new();
        handle_text_frame(
            r#"{"type":"join","conversationId":"c1","userId":"u1"}"#,
            conn,
            &mut subs,
            &registry,
            &bus,
        )
        .await;

        let mut rx = bus.subscribe();
        finish(conn, &registry, &bus).await;

        assert!(registry.is_empty().await);
        let Ok(ChatEvent::UsersOnline { user_ids, .. }) = rx.recv().await else {
            panic!("expected presence refresh");
        };
        assert!(user_ids.is_empty());
    }
}
