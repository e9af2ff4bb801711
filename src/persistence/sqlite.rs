//! SQLite implementation of the persistence layer.
//!
//! Ids are opaque TEXT; timestamps are written by the application as
//! `chrono` values. Referential integrity (author exists, message exists)
//! is enforced here via foreign keys, not re-validated by the relay. The
//! reaction uniqueness invariant lives in the schema as
//! `UNIQUE (message_id, user_id, emoji)`.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::domain::entities::{Conversation, Message, Reaction, User};
use crate::domain::ids::{ConversationId, MessageId, ReactionId, UserId};
use crate::error::ChatError;

/// SQLite-backed store using `sqlx::SqlitePool`.
#[derive(Debug, Clone)]
pub struct ChatStore {
    pool: SqlitePool,
}

impl ChatStore {
    /// Opens a connection pool for the given database URL.
    ///
    /// The database file is created if missing and foreign keys are
    /// enabled on every connection.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] if the URL is invalid or the
    /// database cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, ChatError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on migration failure.
    pub async fn migrate(&self) -> Result<(), ChatError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ChatError::Persistence(e.to_string()))
    }

    // ── Users ───────────────────────────────────────────────────────────

    /// Creates a user, or returns the existing one with the same username.
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the conflicting row,
    /// so repeated calls with the same username return the same id.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn upsert_user(&self, username: &str) -> Result<User, ChatError> {
        let (id, username) = sqlx::query_as::<_, (String, String)>(
            "INSERT INTO users (id, username) VALUES (?, ?) \
             ON CONFLICT (username) DO UPDATE SET username = excluded.username \
             RETURNING id, username",
        )
        .bind(UserId::generate().as_str())
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(User {
            id: UserId::from(id),
            username,
        })
    }

    // ── Conversations ───────────────────────────────────────────────────

    /// Creates a conversation and memberships for the initial member list.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure, including a
    /// member id that references no user.
    pub async fn create_conversation(
        &self,
        title: &str,
        member_user_ids: &[UserId],
    ) -> Result<Conversation, ChatError> {
        let id = ConversationId::generate();
        let created_at = Utc::now();

        sqlx::query("INSERT INTO conversations (id, title, created_at) VALUES (?, ?, ?)")
            .bind(id.as_str())
            .bind(title)
            .bind(created_at)
            .execute(&self.pool)
            .await?;

        for user_id in member_user_ids {
            sqlx::query(
                "INSERT INTO memberships (user_id, conversation_id) VALUES (?, ?) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        }

        Ok(Conversation {
            id,
            title: title.to_string(),
            created_at,
        })
    }

    /// Returns the conversations the user is a member of, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, ChatError> {
        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            "SELECT c.id, c.title, c.created_at \
             FROM conversations c \
             JOIN memberships ms ON ms.conversation_id = c.id \
             WHERE ms.user_id = ? \
             ORDER BY c.created_at DESC, c.rowid DESC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, created_at)| Conversation {
                id: ConversationId::from(id),
                title,
                created_at,
            })
            .collect())
    }

    // ── Messages ────────────────────────────────────────────────────────

    /// Inserts a message and returns it hydrated.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure, including
    /// an author or conversation id that references nothing.
    pub async fn create_message(
        &self,
        conversation_id: &ConversationId,
        author_id: &UserId,
        text: &str,
    ) -> Result<Message, ChatError> {
        let id = MessageId::generate();

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, author_id, text, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(conversation_id.as_str())
        .bind(author_id.as_str())
        .bind(text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.message_by_id(&id).await?.ok_or_else(|| {
            ChatError::Internal(format!("message {id} vanished right after insert"))
        })
    }

    /// Fetches one message hydrated with author and reactions.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn message_by_id(&self, id: &MessageId) -> Result<Option<Message>, ChatError> {
        let row = sqlx::query_as::<_, (String, String, String, String, DateTime<Utc>, String)>(
            "SELECT m.id, m.conversation_id, m.author_id, m.text, m.created_at, u.username \
             FROM messages m \
             JOIN users u ON u.id = m.author_id \
             WHERE m.id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, conversation_id, author_id, text, created_at, username)) = row else {
            return Ok(None);
        };

        let reactions = self.reactions_for_message(id.as_str()).await?;
        Ok(Some(assemble_message(
            id,
            conversation_id,
            author_id,
            text,
            created_at,
            username,
            reactions,
        )))
    }

    /// Returns a conversation's messages, oldest first, hydrated.
    ///
    /// An unknown conversation id yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn messages_in_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, ChatError> {
        let rows = sqlx::query_as::<_, (String, String, String, String, DateTime<Utc>, String)>(
            "SELECT m.id, m.conversation_id, m.author_id, m.text, m.created_at, u.username \
             FROM messages m \
             JOIN users u ON u.id = m.author_id \
             WHERE m.conversation_id = ? \
             ORDER BY m.created_at ASC, m.rowid ASC",
        )
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let reaction_rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT r.id, r.message_id, r.user_id, r.emoji \
             FROM reactions r \
             JOIN messages m ON m.id = r.message_id \
             WHERE m.conversation_id = ? \
             ORDER BY r.rowid ASC",
        )
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut by_message: HashMap<String, Vec<Reaction>> = HashMap::new();
        for (id, message_id, user_id, emoji) in reaction_rows {
            by_message
                .entry(message_id.clone())
                .or_default()
                .push(Reaction {
                    id: ReactionId::from(id),
                    message_id: MessageId::from(message_id),
                    user_id: UserId::from(user_id),
                    emoji,
                });
        }

        Ok(rows
            .into_iter()
            .map(|(id, conversation_id, author_id, text, created_at, username)| {
                let reactions = by_message.remove(id.as_str()).unwrap_or_default();
                assemble_message(
                    id,
                    conversation_id,
                    author_id,
                    text,
                    created_at,
                    username,
                    reactions,
                )
            })
            .collect())
    }

    /// Replaces a message's text.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn update_message_text(&self, id: &MessageId, text: &str) -> Result<(), ChatError> {
        sqlx::query("UPDATE messages SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deletes a message; its reactions cascade away with it.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn delete_message(&self, id: &MessageId) -> Result<(), ChatError> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ── Reactions ───────────────────────────────────────────────────────

    /// Looks up the reaction for an exact (message, user, emoji) triple.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn find_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        emoji: &str,
    ) -> Result<Option<Reaction>, ChatError> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, message_id, user_id, emoji FROM reactions \
             WHERE message_id = ? AND user_id = ? AND emoji = ?",
        )
        .bind(message_id.as_str())
        .bind(user_id.as_str())
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, message_id, user_id, emoji)| Reaction {
            id: ReactionId::from(id),
            message_id: MessageId::from(message_id),
            user_id: UserId::from(user_id),
            emoji,
        }))
    }

    /// Inserts a reaction for the triple.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure, including a
    /// duplicate triple or a message id that references nothing.
    pub async fn insert_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        emoji: &str,
    ) -> Result<Reaction, ChatError> {
        let id = ReactionId::generate();

        sqlx::query("INSERT INTO reactions (id, message_id, user_id, emoji) VALUES (?, ?, ?, ?)")
            .bind(id.as_str())
            .bind(message_id.as_str())
            .bind(user_id.as_str())
            .bind(emoji)
            .execute(&self.pool)
            .await?;

        Ok(Reaction {
            id,
            message_id: message_id.clone(),
            user_id: user_id.clone(),
            emoji: emoji.to_string(),
        })
    }

    /// Deletes a reaction by id.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on database failure.
    pub async fn delete_reaction(&self, id: &ReactionId) -> Result<(), ChatError> {
        sqlx::query("DELETE FROM reactions WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reactions_for_message(&self, message_id: &str) -> Result<Vec<Reaction>, ChatError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, message_id, user_id, emoji FROM reactions \
             WHERE message_id = ? ORDER BY rowid ASC",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, message_id, user_id, emoji)| Reaction {
                id: ReactionId::from(id),
                message_id: MessageId::from(message_id),
                user_id: UserId::from(user_id),
                emoji,
            })
            .collect())
    }
}

fn assemble_message(
    id: String,
    conversation_id: String,
    author_id: String,
    text: String,
    created_at: DateTime<Utc>,
    author_username: String,
    reactions: Vec<Reaction>,
) -> Message {
    let author_id = UserId::from(author_id);
    Message {
        id: MessageId::from(id),
        conversation_id: ConversationId::from(conversation_id),
        author_id: author_id.clone(),
        text,
        created_at,
        author: User {
            id: author_id,
            username: author_username,
        },
        reactions,
    }
}
