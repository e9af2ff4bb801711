//! Message and reaction endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::MessageId;

/// Body of `POST /messages`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    /// Target conversation id. Required.
    pub conversation_id: Option<String>,
    /// Author user id. Required; trusted as supplied.
    pub author_id: Option<String>,
    /// Message body. Required; empty counts as missing.
    pub text: Option<String>,
}

/// Query of `GET /messages`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageListParams {
    /// Conversation to list. Required; unknown ids list empty.
    pub conversation_id: Option<String>,
}

/// Body of `PATCH /messages/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    /// Replacement text. Required; empty counts as missing.
    pub text: Option<String>,
    /// Caller's user id; must equal the message's author id.
    pub author_id: Option<String>,
}

/// Body of `DELETE /messages/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageRequest {
    /// Caller's user id; must equal the message's author id.
    pub author_id: Option<String>,
}

/// Body of `POST /messages/{id}/reactions`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    /// Reacting user id. Required.
    pub user_id: Option<String>,
    /// Emoji to toggle. Required; empty counts as missing.
    pub emoji: Option<String>,
}

/// Response of `DELETE /messages/{id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteMessageResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Id of the deleted message.
    pub id: MessageId,
}
