//! Chat service: orchestrates persistence and emits relay events.

use crate::domain::entities::{Conversation, Message, User};
use crate::domain::ids::{ConversationId, MessageId, UserId};
use crate::domain::{ChatEvent, EventBus};
use crate::error::ChatError;
use crate::persistence::ChatStore;

/// Orchestration layer for all chat mutations.
///
/// Stateless coordinator: owns the [`ChatStore`] for persistence and the
/// [`EventBus`] for fan-out. Every mutation follows the pattern: validate
/// → persist → publish event → return. Persist and publish are not
/// transactional; a crash between the two loses only the broadcast, never
/// the write.
#[derive(Debug, Clone)]
pub struct ChatService {
    store: ChatStore,
    event_bus: EventBus,
}

impl ChatService {
    /// Creates a new `ChatService`.
    #[must_use]
    pub fn new(store: ChatStore, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`ChatStore`].
    #[must_use]
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Creates a user, idempotently by username.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on persistence failure.
    pub async fn create_user(&self, username: &str) -> Result<User, ChatError> {
        let user = self.store.upsert_user(username).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user upserted");
        Ok(user)
    }

    /// Creates a conversation with an initial member list.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on persistence failure, including member
    /// ids that reference no user.
    pub async fn create_conversation(
        &self,
        title: &str,
        member_user_ids: &[UserId],
    ) -> Result<Conversation, ChatError> {
        let conversation = self.store.create_conversation(title, member_user_ids).await?;
        tracing::info!(
            conversation_id = %conversation.id,
            members = member_user_ids.len(),
            "conversation created"
        );
        Ok(conversation)
    }

    /// Lists the conversations a user belongs to, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on persistence failure.
    pub async fn conversations_for(&self, user_id: &UserId) -> Result<Vec<Conversation>, ChatError> {
        self.store.conversations_for_user(user_id).await
    }

    /// Posts a message and broadcasts `message:new` to the room.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on persistence failure.
    pub async fn post_message(
        &self,
        conversation_id: &ConversationId,
        author_id: &UserId,
        text: &str,
    ) -> Result<Message, ChatError> {
        let message = self
            .store
            .create_message(conversation_id, author_id, text)
            .await?;

        let _ = self.event_bus.publish(ChatEvent::MessageNew {
            message: message.clone(),
        });

        tracing::info!(message_id = %message.id, conversation_id = %conversation_id, "message posted");
        Ok(message)
    }

    /// Returns a conversation's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on persistence failure.
    pub async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, ChatError> {
        self.store.messages_in_conversation(conversation_id).await
    }

    /// Edits a message's text and broadcasts `message:updated`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] if the message is absent and
    /// [`ChatError::Forbidden`] if the caller is not its author.
    pub async fn edit_message(
        &self,
        id: &MessageId,
        author_id: &UserId,
        text: &str,
    ) -> Result<Message, ChatError> {
        let existing = self
            .store
            .message_by_id(id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(id.clone()))?;

        if &existing.author_id != author_id {
            return Err(ChatError::Forbidden(
                "only the author may edit a message".to_string(),
            ));
        }

        self.store.update_message_text(id, text).await?;

        // Re-read so the broadcast matches what the store now holds; a
        // concurrent delete turns the edit into a 404 with no broadcast.
        let message = self
            .store
            .message_by_id(id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(id.clone()))?;

        let _ = self.event_bus.publish(ChatEvent::MessageUpdated {
            message: message.clone(),
        });

        tracing::info!(message_id = %id, "message edited");
        Ok(message)
    }

    /// Deletes a message and broadcasts `message:deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] if the message is absent and
    /// [`ChatError::Forbidden`] if the caller is not its author.
    pub async fn delete_message(
        &self,
        id: &MessageId,
        author_id: &UserId,
    ) -> Result<MessageId, ChatError> {
        let existing = self
            .store
            .message_by_id(id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(id.clone()))?;

        if &existing.author_id != author_id {
            return Err(ChatError::Forbidden(
                "only the author may delete a message".to_string(),
            ));
        }

        self.store.delete_message(id).await?;

        let _ = self.event_bus.publish(ChatEvent::MessageDeleted {
            id: id.clone(),
            conversation_id: existing.conversation_id,
        });

        tracing::info!(message_id = %id, "message deleted");
        Ok(id.clone())
    }

    /// Toggles a reaction on the (message, user, emoji) triple and
    /// broadcasts `reaction:added` or `reaction:removed`.
    ///
    /// Returns the message as it stands after the toggle.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] if the message is absent —
    /// including when it vanishes between the toggle and the re-read, in
    /// which case nothing is broadcast.
    pub async fn toggle_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        emoji: &str,
    ) -> Result<Message, ChatError> {
        if self.store.message_by_id(message_id).await?.is_none() {
            return Err(ChatError::MessageNotFound(message_id.clone()));
        }

        let existing = self.store.find_reaction(message_id, user_id, emoji).await?;

        match existing {
            Some(reaction) => {
                self.store.delete_reaction(&reaction.id).await?;
                let message = self
                    .store
                    .message_by_id(message_id)
                    .await?
                    .ok_or_else(|| ChatError::MessageNotFound(message_id.clone()))?;

                let _ = self.event_bus.publish(ChatEvent::ReactionRemoved {
                    user_id: user_id.clone(),
                    emoji: emoji.to_string(),
                    message: message.clone(),
                });

                tracing::info!(message_id = %message_id, %emoji, "reaction removed");
                Ok(message)
            }
            None => {
                let reaction = self.store.insert_reaction(message_id, user_id, emoji).await?;
                let message = self
                    .store
                    .message_by_id(message_id)
                    .await?
                    .ok_or_else(|| ChatError::MessageNotFound(message_id.clone()))?;

                let _ = self.event_bus.publish(ChatEvent::ReactionAdded {
                    reaction,
                    message: message.clone(),
                });

                tracing::info!(message_id = %message_id, %emoji, "reaction added");
                Ok(message)
            }
        }
    }
}
